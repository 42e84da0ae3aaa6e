use serde::{Deserialize, Serialize};
use serde_json::json;
use strum::{Display, EnumString};

/// Minutes a start action runs for when the caller does not say.
pub const DEFAULT_START_MINUTES: u32 = 30;

/// Device entry as returned by the list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Device {
    pub id: String,
    pub attributes: DeviceAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceAttributes {
    pub system: SystemAttributes,
    pub mower: MowerAttributes,
    pub battery: BatteryAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemAttributes {
    pub name: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MowerAttributes {
    pub activity: String,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatteryAttributes {
    #[serde(rename = "batteryPercent")]
    pub battery_percent: u8,
}

/// The fields the dashboard shows for one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSummary {
    pub id: String,
    pub name: String,
    pub activity: String,
    pub battery_percent: u8,
}

impl From<Device> for DeviceSummary {
    fn from(device: Device) -> Self {
        Self {
            id: device.id,
            name: device.attributes.system.name,
            activity: device.attributes.mower.activity,
            battery_percent: device.attributes.battery.battery_percent,
        }
    }
}

/// Result of listing devices for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceListing {
    Found(DeviceSummary),
    NoDevices,
}

/// How the list endpoint wraps its payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum PayloadEnvelope {
    /// `{"data": [...]}`
    #[default]
    JsonApi,
    /// `[...]`
    Bare,
}

/// Action sent to the device's actuator endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceAction {
    Start { duration_minutes: u32 },
    Park,
}

impl DeviceAction {
    pub fn start() -> Self {
        Self::Start {
            duration_minutes: DEFAULT_START_MINUTES,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Start { .. } => "Start",
            Self::Park => "Park",
        }
    }

    /// JSON:API request body for this action.
    pub fn to_payload(&self) -> serde_json::Value {
        let attributes = match self {
            Self::Start { duration_minutes } => json!({ "duration": duration_minutes }),
            Self::Park => json!({}),
        };
        json!({
            "data": {
                "type": self.kind(),
                "attributes": attributes,
            }
        })
    }
}
