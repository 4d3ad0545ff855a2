use crate::application::ports::MarcaGateway;
use crate::domain::entities::{Marca, MarcaDraft, MarcaPatch, MarcasDetalles};
use crate::domain::value_objects::{MarcaFilter, MarcaId, PageRequest};
use crate::shared::config::ApiConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// マーカAPIへのHTTPゲートウェイ。
///
/// 応答は必ずスキーマ検証してから信用する。検証に失敗した応答は
/// 取得失敗として扱い、呼び出し側へ `ValidationError` を返す。
/// リトライはしない。再試行するかどうかは呼び出し側の判断。
pub struct RestMarcaGateway {
    client: reqwest::Client,
    base_url: String,
}

impl RestMarcaGateway {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(AppError::ConfigurationError(
                "base_url cannot be empty".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| AppError::ConfigurationError(err.to_string()))?;
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// リクエストを送り、ステータスを確認してボディを返す。
    /// 204や空ボディは `None`
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Option<Value>, AppError> {
        let response = request.send().await.map_err(AppError::from)?;
        let status = response.status();
        let text = response.text().await.map_err(AppError::from)?;
        let body = if text.is_empty() {
            None
        } else {
            Some(safe_json(&text))
        };

        if !status.is_success() {
            debug!(status = status.as_u16(), "request failed");
            return Err(AppError::http(status.as_u16(), body));
        }
        Ok(body)
    }
}

#[async_trait]
impl MarcaGateway for RestMarcaGateway {
    async fn list(
        &self,
        filter: &MarcaFilter,
        page: &PageRequest,
    ) -> Result<Vec<Marca>, AppError> {
        let request = self
            .client
            .get(self.url("/marcas"))
            .query(&list_query(filter, page));
        let body = self.execute(request).await?;
        decode_lista(require_body(body)?)
    }

    async fn detail(&self, id: MarcaId) -> Result<Marca, AppError> {
        let request = self.client.get(self.url(&format!("/marcas/{}", id)));
        let body = self
            .execute(request)
            .await
            .map_err(|err| not_found_for(err, id))?;
        decode_marca(require_body(body)?)
    }

    async fn create(&self, draft: &MarcaDraft) -> Result<Marca, AppError> {
        let request = self.client.post(self.url("/marcas")).json(draft);
        let body = self.execute(request).await?;
        decode_marca(require_body(body)?)
    }

    async fn update(&self, id: MarcaId, patch: &MarcaPatch) -> Result<Marca, AppError> {
        let request = self
            .client
            .patch(self.url(&format!("/marcas/{}", id)))
            .json(patch);
        let body = self
            .execute(request)
            .await
            .map_err(|err| not_found_for(err, id))?;
        decode_marca(require_body(body)?)
    }

    async fn delete(&self, id: MarcaId) -> Result<(), AppError> {
        let request = self.client.delete(self.url(&format!("/marcas/{}", id)));
        // 204を返すバックエンドと削除済みレコードを返すバックエンドの両方を受け付ける
        let body = self
            .execute(request)
            .await
            .map_err(|err| not_found_for(err, id))?;
        if let Some(body) = body {
            if body.is_object() {
                decode_marca(body)?;
            }
        }
        Ok(())
    }

    async fn detalles(&self) -> Result<MarcasDetalles, AppError> {
        let request = self.client.get(self.url("/marcas/detalles"));
        let body = self.execute(request).await?;
        decode_detalles(require_body(body)?)
    }
}

fn list_query(filter: &MarcaFilter, page: &PageRequest) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("limit", page.limit.to_string()),
        ("offset", page.offset.to_string()),
    ];
    if let Some(estado) = filter.estado {
        query.push(("estado", estado.to_string()));
    }
    if let Some(search) = filter.search() {
        query.push(("search", search.to_string()));
    }
    query
}

fn not_found_for(err: AppError, id: MarcaId) -> AppError {
    match err.status() {
        Some(status) if status == StatusCode::NOT_FOUND.as_u16() => {
            AppError::NotFound(format!("marca {} does not exist", id))
        }
        _ => err,
    }
}

fn require_body(body: Option<Value>) -> Result<Value, AppError> {
    body.ok_or_else(|| AppError::ValidationError("response body is empty".to_string()))
}

fn safe_json(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn decode_marca(value: Value) -> Result<Marca, AppError> {
    let marca: Marca = serde_json::from_value(value).map_err(|err| {
        AppError::ValidationError(format!("marca response does not match schema: {}", err))
    })?;
    if marca.id.value() < 0 {
        return Err(AppError::ValidationError(format!(
            "marca response carries negative id {}",
            marca.id
        )));
    }
    marca.validate().map_err(AppError::ValidationError)?;
    Ok(marca)
}

fn decode_lista(value: Value) -> Result<Vec<Marca>, AppError> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(AppError::ValidationError(format!(
                "expected array of marcas, got {}",
                other
            )));
        }
    };
    items.into_iter().map(decode_marca).collect()
}

fn decode_detalles(value: Value) -> Result<MarcasDetalles, AppError> {
    serde_json::from_value(value).map_err(|err| {
        AppError::ValidationError(format!("detalles response does not match schema: {}", err))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Estado;
    use serde_json::json;

    fn config() -> ApiConfig {
        ApiConfig {
            base_url: "http://localhost:8000/api/v1".to_string(),
            timeout_secs: 15,
        }
    }

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let gateway = RestMarcaGateway::new(&ApiConfig {
            base_url: "http://localhost:8000/api/v1/".to_string(),
            timeout_secs: 15,
        })
        .unwrap();
        assert_eq!(gateway.url("/marcas"), "http://localhost:8000/api/v1/marcas");
        assert_eq!(
            gateway.url("/marcas/7"),
            "http://localhost:8000/api/v1/marcas/7"
        );
    }

    #[test]
    fn test_rejects_empty_base_url() {
        let result = RestMarcaGateway::new(&ApiConfig {
            base_url: String::new(),
            timeout_secs: 15,
        });
        assert!(matches!(result, Err(AppError::ConfigurationError(_))));
    }

    #[test]
    fn test_list_query_includes_only_set_filters() {
        let page = PageRequest::new(50, 100);
        let all = list_query(&MarcaFilter::all(), &page);
        assert_eq!(
            all,
            vec![("limit", "50".to_string()), ("offset", "100".to_string())]
        );

        let filtered = list_query(
            &MarcaFilter::new(Some(Estado::Activa), Some("Acme")),
            &page,
        );
        assert!(filtered.contains(&("estado", "ACTIVA".to_string())));
        assert!(filtered.contains(&("search", "acme".to_string())));
    }

    #[test]
    fn test_decode_marca_accepts_valid_body() {
        let marca = decode_marca(json!({
            "id": 7,
            "nombre": "Acme",
            "titulo": "Acme S.A.",
            "estado": "ACTIVA"
        }))
        .unwrap();
        assert_eq!(marca.id.value(), 7);
        assert_eq!(marca.estado, Estado::Activa);
    }

    #[test]
    fn test_decode_marca_rejects_schema_mismatch() {
        // フィールド欠落
        assert!(matches!(
            decode_marca(json!({ "id": 7, "nombre": "Acme" })),
            Err(AppError::ValidationError(_))
        ));
        // 未知のestado
        assert!(matches!(
            decode_marca(json!({
                "id": 7,
                "nombre": "Acme",
                "titulo": "Acme S.A.",
                "estado": "VENCIDA"
            })),
            Err(AppError::ValidationError(_))
        ));
        // 空のnombre
        assert!(matches!(
            decode_marca(json!({
                "id": 7,
                "nombre": "",
                "titulo": "Acme S.A.",
                "estado": "ACTIVA"
            })),
            Err(AppError::ValidationError(_))
        ));
        // 負のID
        assert!(matches!(
            decode_marca(json!({
                "id": -7,
                "nombre": "Acme",
                "titulo": "Acme S.A.",
                "estado": "ACTIVA"
            })),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_decode_lista_validates_every_element() {
        let valid = decode_lista(json!([
            { "id": 1, "nombre": "A", "titulo": "A S.A.", "estado": "ACTIVA" },
            { "id": 2, "nombre": "B", "titulo": "B S.A.", "estado": "INACTIVA" }
        ]))
        .unwrap();
        assert_eq!(valid.len(), 2);

        assert!(matches!(
            decode_lista(json!({ "no": "array" })),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            decode_lista(json!([
                { "id": 1, "nombre": "A", "titulo": "A S.A.", "estado": "ACTIVA" },
                { "id": 2 }
            ])),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_decode_detalles_round_trip() {
        let detalles = decode_detalles(json!({
            "total": 12,
            "pendientes": 3,
            "vencimientos": 1,
            "aprobadasMes": 2,
            "actividadReciente": []
        }))
        .unwrap();
        assert_eq!(detalles.total, 12);
        assert!(matches!(
            decode_detalles(json!({ "total": 12 })),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_not_found_mapping_only_rewrites_404() {
        let id = MarcaId::new(9);
        let mapped = not_found_for(AppError::http(404, None), id);
        assert!(matches!(mapped, AppError::NotFound(_)));

        let untouched = not_found_for(AppError::http(500, None), id);
        assert!(matches!(untouched, AppError::Http { status: 500, .. }));

        let network = not_found_for(AppError::Network("down".to_string()), id);
        assert!(matches!(network, AppError::Network(_)));
    }

    #[test]
    fn test_safe_json_falls_back_to_raw_text() {
        assert_eq!(safe_json("{\"ok\":true}"), json!({ "ok": true }));
        assert_eq!(safe_json("not json"), Value::String("not json".to_string()));
    }

    #[test]
    fn test_gateway_builds_with_default_config() {
        assert!(RestMarcaGateway::new(&config()).is_ok());
    }
}
