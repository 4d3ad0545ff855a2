use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActividadReciente {
    pub id: i64,
    pub action: String,
    pub marca: String,
    pub titular: String,
    /// ISO 8601 または可読表記（例: "Hace 2 horas"）
    pub fecha: String,
    /// バックエンドが別表記を返すことがあるため文字列のまま保持する
    pub estado: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarcasDetalles {
    pub total: u64,
    pub pendientes: u64,
    pub vencimientos: u64,
    #[serde(rename = "aprobadasMes")]
    pub aprobadas_mes: u64,
    #[serde(rename = "actividadReciente")]
    pub actividad_reciente: Vec<ActividadReciente>,
}
