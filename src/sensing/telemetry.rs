//! Simulated appliance telemetry. Readings come from a fixed scenario table;
//! nothing here talks to real hardware.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum WaterLevel {
    Adequate,
    Low,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PowerStatus {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SensorScenario {
    pub name: &'static str,
    pub temperature_c: f32,
    pub water_level: WaterLevel,
    pub power_status: PowerStatus,
    pub vibration: u8,
    pub issue: Option<&'static str>,
    pub advice: &'static [&'static str],
}

pub const SENSOR_SCENARIOS: [SensorScenario; 4] = [
    SensorScenario {
        name: "Normal Operation",
        temperature_c: 95.0,
        water_level: WaterLevel::Adequate,
        power_status: PowerStatus::On,
        vibration: 2,
        issue: None,
        advice: &["Kettle operating normally", "Ready to serve hot water"],
    },
    SensorScenario {
        name: "Power Issue",
        temperature_c: 25.0,
        water_level: WaterLevel::Adequate,
        power_status: PowerStatus::Off,
        vibration: 0,
        issue: Some("No power detected"),
        advice: &[
            "Check power cord connection",
            "Verify outlet is working",
            "Press power button",
        ],
    },
    SensorScenario {
        name: "Low Water",
        temperature_c: 30.0,
        water_level: WaterLevel::Low,
        power_status: PowerStatus::On,
        vibration: 0,
        issue: Some("Insufficient water"),
        advice: &[
            "Add water to minimum level",
            "Check for leaks",
            "Clean water reservoir",
        ],
    },
    SensorScenario {
        name: "Overheating",
        temperature_c: 105.0,
        water_level: WaterLevel::Adequate,
        power_status: PowerStatus::On,
        vibration: 3,
        issue: Some("Temperature too high"),
        advice: &[
            "Allow cooling period",
            "Check for blockages",
            "Reduce heating time",
        ],
    },
];

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Operational,
    IssueDetected,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SensorDiagnosis {
    pub status: DeviceStatus,
    pub recommendations: Vec<String>,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SensorReport {
    pub sensors: SensorScenario,
    pub diagnosis: SensorDiagnosis,
}

impl From<&SensorScenario> for SensorReport {
    fn from(scenario: &SensorScenario) -> Self {
        let (status, priority) = match scenario.issue {
            Some(_) => (DeviceStatus::IssueDetected, Priority::Medium),
            None => (DeviceStatus::Operational, Priority::Low),
        };

        Self {
            sensors: *scenario,
            diagnosis: SensorDiagnosis {
                status,
                recommendations: scenario.advice.iter().map(|s| s.to_string()).collect(),
                priority,
            },
        }
    }
}
