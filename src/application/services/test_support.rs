use crate::application::ports::MarcaGateway;
use crate::domain::entities::{Marca, MarcaDraft, MarcaPatch, MarcasDetalles};
use crate::domain::value_objects::{Estado, MarcaFilter, MarcaId, PageRequest};
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

type Step<T> = (Option<Arc<Notify>>, Result<T, AppError>);

/// 応答を台本どおりに返すゲートウェイ。
/// ゲート付きのステップは `Notify` が叩かれるまで応答を保留する。
pub(crate) struct ScriptedGateway {
    list_steps: Mutex<VecDeque<Step<Vec<Marca>>>>,
    detail_steps: Mutex<VecDeque<Step<Marca>>>,
    create_steps: Mutex<VecDeque<Step<Marca>>>,
    update_steps: Mutex<VecDeque<Step<Marca>>>,
    delete_steps: Mutex<VecDeque<Step<()>>>,
    detalles_steps: Mutex<VecDeque<Step<MarcasDetalles>>>,
    pub list_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub detalles_calls: AtomicUsize,
    pub list_requests: Mutex<Vec<(MarcaFilter, PageRequest)>>,
    pub update_requests: Mutex<Vec<(MarcaId, MarcaPatch)>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            list_steps: Mutex::new(VecDeque::new()),
            detail_steps: Mutex::new(VecDeque::new()),
            create_steps: Mutex::new(VecDeque::new()),
            update_steps: Mutex::new(VecDeque::new()),
            delete_steps: Mutex::new(VecDeque::new()),
            detalles_steps: Mutex::new(VecDeque::new()),
            list_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            detalles_calls: AtomicUsize::new(0),
            list_requests: Mutex::new(Vec::new()),
            update_requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn push_list(&self, gate: Option<Arc<Notify>>, result: Result<Vec<Marca>, AppError>) {
        self.list_steps.lock().await.push_back((gate, result));
    }

    pub async fn push_detail(&self, gate: Option<Arc<Notify>>, result: Result<Marca, AppError>) {
        self.detail_steps.lock().await.push_back((gate, result));
    }

    pub async fn push_create(&self, gate: Option<Arc<Notify>>, result: Result<Marca, AppError>) {
        self.create_steps.lock().await.push_back((gate, result));
    }

    pub async fn push_update(&self, gate: Option<Arc<Notify>>, result: Result<Marca, AppError>) {
        self.update_steps.lock().await.push_back((gate, result));
    }

    pub async fn push_delete(&self, gate: Option<Arc<Notify>>, result: Result<(), AppError>) {
        self.delete_steps.lock().await.push_back((gate, result));
    }

    pub async fn push_detalles(
        &self,
        gate: Option<Arc<Notify>>,
        result: Result<MarcasDetalles, AppError>,
    ) {
        self.detalles_steps.lock().await.push_back((gate, result));
    }

    async fn next<T>(steps: &Mutex<VecDeque<Step<T>>>, what: &str) -> Result<T, AppError> {
        let (gate, result) = steps
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected {} call", what));
        if let Some(gate) = gate {
            gate.notified().await;
        }
        result
    }
}

#[async_trait]
impl MarcaGateway for ScriptedGateway {
    async fn list(
        &self,
        filter: &MarcaFilter,
        page: &PageRequest,
    ) -> Result<Vec<Marca>, AppError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.list_requests.lock().await.push((filter.clone(), *page));
        Self::next(&self.list_steps, "list").await
    }

    async fn detail(&self, _id: MarcaId) -> Result<Marca, AppError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.detail_steps, "detail").await
    }

    async fn create(&self, _draft: &MarcaDraft) -> Result<Marca, AppError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.create_steps, "create").await
    }

    async fn update(&self, id: MarcaId, patch: &MarcaPatch) -> Result<Marca, AppError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.update_requests.lock().await.push((id, patch.clone()));
        Self::next(&self.update_steps, "update").await
    }

    async fn delete(&self, _id: MarcaId) -> Result<(), AppError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.delete_steps, "delete").await
    }

    async fn detalles(&self) -> Result<MarcasDetalles, AppError> {
        self.detalles_calls.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.detalles_steps, "detalles").await
    }
}

pub(crate) fn gate() -> Arc<Notify> {
    Arc::new(Notify::new())
}

pub(crate) fn marca(id: i64, nombre: &str, estado: Estado) -> Marca {
    Marca {
        id: MarcaId::new(id),
        nombre: nombre.to_string(),
        titulo: format!("{} S.A.", nombre),
        estado,
    }
}

pub(crate) fn net_err() -> AppError {
    AppError::Network("connection reset".to_string())
}
