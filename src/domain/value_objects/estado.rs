use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Estado {
    Activa,
    Inactiva,
    Suspendida,
}

impl Estado {
    pub fn as_str(&self) -> &'static str {
        match self {
            Estado::Activa => "ACTIVA",
            Estado::Inactiva => "INACTIVA",
            Estado::Suspendida => "SUSPENDIDA",
        }
    }
}

impl fmt::Display for Estado {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Estado {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ACTIVA" => Ok(Estado::Activa),
            "INACTIVA" => Ok(Estado::Inactiva),
            "SUSPENDIDA" => Ok(Estado::Suspendida),
            other => Err(format!("Unknown estado: {}", other)),
        }
    }
}
