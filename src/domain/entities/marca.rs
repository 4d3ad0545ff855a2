use crate::domain::value_objects::{Estado, MarcaId};
use serde::{Deserialize, Serialize};

const MAX_FIELD_LEN: usize = 255;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Marca {
    pub id: MarcaId,
    pub nombre: String,
    pub titulo: String,
    pub estado: Estado,
}

impl Marca {
    /// サーバ応答をスキーマとして検証する
    pub fn validate(&self) -> Result<(), String> {
        validate_field("nombre", &self.nombre)?;
        validate_field("titulo", &self.titulo)?;
        Ok(())
    }

    /// 未送信の作成入力からプレースホルダを組み立てる
    pub fn provisional(id: MarcaId, draft: &MarcaDraft) -> Self {
        Self {
            id,
            nombre: draft.nombre.clone(),
            titulo: draft.titulo.clone(),
            estado: draft.estado,
        }
    }

    /// 部分更新をローカルに適用する。`None` のフィールドは変更しない。
    pub fn apply_patch(&mut self, patch: &MarcaPatch) {
        if let Some(nombre) = &patch.nombre {
            self.nombre = nombre.clone();
        }
        if let Some(titulo) = &patch.titulo {
            self.titulo = titulo.clone();
        }
        if let Some(estado) = patch.estado {
            self.estado = estado;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarcaDraft {
    pub nombre: String,
    pub titulo: String,
    pub estado: Estado,
}

impl MarcaDraft {
    pub fn new(nombre: String, titulo: String, estado: Estado) -> Result<Self, String> {
        validate_field("nombre", &nombre)?;
        validate_field("titulo", &titulo)?;
        Ok(Self {
            nombre,
            titulo,
            estado,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarcaPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<Estado>,
}

impl MarcaPatch {
    pub fn is_empty(&self) -> bool {
        self.nombre.is_none() && self.titulo.is_none() && self.estado.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(nombre) = &self.nombre {
            validate_field("nombre", nombre)?;
        }
        if let Some(titulo) = &self.titulo {
            validate_field("titulo", titulo)?;
        }
        Ok(())
    }
}

fn validate_field(name: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{} cannot be empty", name));
    }
    if value.len() > MAX_FIELD_LEN {
        return Err(format!("{} exceeds {} characters", name, MAX_FIELD_LEN));
    }
    Ok(())
}
