//! In-memory stand-in for the `/Clientes` backend.
//!
//! Mirrors the contract the client consumes: 201 on create, 204 on update
//! and delete, 400 for invalid payloads, 404 for unknown ids, 409 when the
//! CPF or email is already taken, and 401 when a bearer token is configured
//! and the request does not present it.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cliente {
    pub id: u64,
    pub nome: String,
    pub email: String,
    pub cpf: String,
    pub status: String,
    pub data_nascimento: Option<String>,
    pub data_inclusao: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClienteBody {
    pub nome: String,
    pub email: String,
    pub cpf: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub data_nascimento: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusBody {
    pub status: String,
}

fn default_status() -> String {
    "Ativo".to_string()
}

#[derive(Default)]
struct Store {
    next_id: u64,
    clientes: BTreeMap<u64, Cliente>,
}

type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    token: Option<Arc<str>>,
}

type ApiResult<T> = Result<T, (StatusCode, String)>;

/// Open backend: no authentication.
pub fn app() -> Router {
    router(None)
}

/// Backend that answers 401 unless `Authorization: Bearer <token>` matches.
pub fn app_with_token(token: &str) -> Router {
    router(Some(Arc::from(token)))
}

fn router(token: Option<Arc<str>>) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::default())),
        token,
    };
    Router::new()
        .route("/Clientes", get(list_clientes).post(create_cliente))
        .route(
            "/Clientes/{id}",
            get(get_cliente).put(update_cliente).delete(delete_cliente),
        )
        .route("/Clientes/{id}/status", patch(patch_status))
        .with_state(state)
}

pub async fn serve(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

fn authorize(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let Some(expected) = state.token.as_deref() else {
        return Ok(());
    };
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if presented == Some(expected) {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "token ausente ou inválido".to_string()))
    }
}

fn validate(body: &ClienteBody) -> ApiResult<()> {
    if body.nome.is_empty() || body.email.is_empty() || body.cpf.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Nome, email e CPF são obrigatórios".to_string(),
        ));
    }
    if body.cpf.len() != 11 || !body.cpf.bytes().all(|b| b.is_ascii_digit()) {
        return Err((StatusCode::BAD_REQUEST, "CPF deve ter 11 dígitos".to_string()));
    }
    validate_status(&body.status)
}

fn validate_status(status: &str) -> ApiResult<()> {
    match status {
        "Ativo" | "Inativo" => Ok(()),
        other => Err((StatusCode::BAD_REQUEST, format!("status inválido: {other}"))),
    }
}

fn check_unique(store: &Store, body: &ClienteBody, except: Option<u64>) -> ApiResult<()> {
    let others = store.clientes.values().filter(|c| Some(c.id) != except);
    for other in others {
        if other.cpf == body.cpf {
            return Err((StatusCode::CONFLICT, "CPF já cadastrado".to_string()));
        }
        if other.email == body.email {
            return Err((StatusCode::CONFLICT, "Email já cadastrado".to_string()));
        }
    }
    Ok(())
}

fn not_found(id: u64) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("cliente {id} não encontrado"))
}

async fn list_clientes(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<Vec<Cliente>>> {
    authorize(&state, &headers)?;
    let store = state.db.read().await;
    Ok(Json(store.clientes.values().cloned().collect()))
}

async fn create_cliente(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ClienteBody>,
) -> ApiResult<(StatusCode, Json<Cliente>)> {
    authorize(&state, &headers)?;
    validate(&body)?;
    let mut store = state.db.write().await;
    check_unique(&store, &body, None)?;

    store.next_id += 1;
    let cliente = Cliente {
        id: store.next_id,
        nome: body.nome,
        email: body.email,
        cpf: body.cpf,
        status: body.status,
        data_nascimento: body.data_nascimento,
        data_inclusao: chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
    };
    store.clientes.insert(cliente.id, cliente.clone());
    Ok((StatusCode::CREATED, Json(cliente)))
}

async fn get_cliente(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> ApiResult<Json<Cliente>> {
    authorize(&state, &headers)?;
    let store = state.db.read().await;
    store.clientes.get(&id).cloned().map(Json).ok_or_else(|| not_found(id))
}

async fn update_cliente(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<ClienteBody>,
) -> ApiResult<StatusCode> {
    authorize(&state, &headers)?;
    validate(&body)?;
    let mut store = state.db.write().await;
    if !store.clientes.contains_key(&id) {
        return Err(not_found(id));
    }
    check_unique(&store, &body, Some(id))?;

    let cliente = store.clientes.get_mut(&id).ok_or_else(|| not_found(id))?;
    cliente.nome = body.nome;
    cliente.email = body.email;
    cliente.cpf = body.cpf;
    cliente.status = body.status;
    cliente.data_nascimento = body.data_nascimento;
    Ok(StatusCode::NO_CONTENT)
}

async fn patch_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Json<Cliente>> {
    authorize(&state, &headers)?;
    validate_status(&body.status)?;
    let mut store = state.db.write().await;
    let cliente = store.clientes.get_mut(&id).ok_or_else(|| not_found(id))?;
    cliente.status = body.status;
    Ok(Json(cliente.clone()))
}

async fn delete_cliente(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> ApiResult<StatusCode> {
    authorize(&state, &headers)?;
    let mut store = state.db.write().await;
    store
        .clientes
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| not_found(id))
}
