//! List view: the record table with inline editing.
//!
//! # Design
//! The view owns the fetched list and one `ViewState`. Editing is a state,
//! not a flag, so there is never more than one edit buffer and it cannot
//! outlive the row it belongs to. Every successful mutation is followed by a
//! full reload; nothing is patched locally. The view is where errors stop:
//! each handler logs, shows an alert through `Ui`, and returns whether the
//! action went through.

use chrono::{Local, Utc};
use tracing::{error, info};

use crate::error::ApiError;
use crate::format::{format_cpf, format_date_display, truncate_date, DateInput};
use crate::sample::sample_cliente;
use crate::service::ClienteService;
use crate::transport::Transport;
use crate::types::{Cliente, ClienteInput, ClienteStatus};

pub const LOAD_ERROR: &str = "Erro ao carregar clientes. Verifique se o backend está rodando.";
pub const LOADING: &str = "Carregando clientes...";
pub const EMPTY_LIST: &str = "Nenhum cliente cadastrado";
pub const DELETE_PROMPT: &str = "Tem certeza que deseja excluir este cliente?";

const HEADERS: [&str; 7] = [
    "ID",
    "Nome",
    "Email",
    "CPF",
    "Status",
    "Data Nasc.",
    "Data Inclusão",
];

/// Blocking, user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    Success(String),
    Error(String),
}

/// What the view needs from whoever hosts it.
pub trait Ui {
    /// Ask a yes/no question; `false` cancels the action.
    fn confirm(&self, message: &str) -> bool;
    fn alert(&self, alert: Alert);
}

impl<U: Ui + ?Sized> Ui for &U {
    fn confirm(&self, message: &str) -> bool {
        (**self).confirm(message)
    }

    fn alert(&self, alert: Alert) {
        (**self).alert(alert)
    }
}

/// Editable copy of one row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    pub nome: String,
    pub email: String,
    pub cpf: String,
    pub status: ClienteStatus,
    /// `YYYY-MM-DD`, or empty.
    pub data_nascimento: String,
}

impl EditBuffer {
    pub fn from_cliente(cliente: &Cliente) -> Self {
        Self {
            nome: cliente.nome.clone(),
            email: cliente.email.clone(),
            cpf: cliente.cpf.clone(),
            status: cliente.status,
            data_nascimento: cliente
                .data_nascimento
                .as_deref()
                .map(truncate_date)
                .unwrap_or_default()
                .to_string(),
        }
    }

    pub fn to_input(&self) -> ClienteInput {
        ClienteInput {
            nome: self.nome.clone(),
            email: self.email.clone(),
            cpf: self.cpf.clone(),
            status: Some(self.status),
            data_nascimento: (!self.data_nascimento.is_empty())
                .then(|| DateInput::Text(self.data_nascimento.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Failed { message: String },
    Idle,
    Editing { id: u64, buffer: EditBuffer },
}

pub struct ClienteListView<T, U> {
    service: ClienteService<T>,
    ui: U,
    clientes: Vec<Cliente>,
    state: ViewState,
}

impl<T: Transport, U: Ui> ClienteListView<T, U> {
    pub fn new(service: ClienteService<T>, ui: U) -> Self {
        Self {
            service,
            ui,
            clientes: Vec::new(),
            state: ViewState::Loading,
        }
    }

    pub fn service(&self) -> &ClienteService<T> {
        &self.service
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn clientes(&self) -> &[Cliente] {
        &self.clientes
    }

    /// Initial load.
    pub fn mount(&mut self) -> bool {
        self.reload()
    }

    /// Re-fetch the full list. Any edit in progress is dropped.
    pub fn reload(&mut self) -> bool {
        self.state = ViewState::Loading;
        match self.service.list_all() {
            Ok(clientes) => {
                self.clientes = clientes;
                self.state = ViewState::Idle;
                true
            }
            Err(e) => {
                error!(error = %e, "could not load clientes");
                self.state = ViewState::Failed {
                    message: LOAD_ERROR.to_string(),
                };
                false
            }
        }
    }

    /// Copy the row into the edit buffer. Unknown ids and unloaded lists are
    /// ignored.
    pub fn begin_edit(&mut self, id: u64) -> bool {
        if !matches!(self.state, ViewState::Idle | ViewState::Editing { .. }) {
            return false;
        }
        let Some(cliente) = self.clientes.iter().find(|c| c.id == id) else {
            return false;
        };
        self.state = ViewState::Editing {
            id,
            buffer: EditBuffer::from_cliente(cliente),
        };
        true
    }

    pub fn edit_buffer_mut(&mut self) -> Option<&mut EditBuffer> {
        match &mut self.state {
            ViewState::Editing { buffer, .. } => Some(buffer),
            _ => None,
        }
    }

    pub fn editing_id(&self) -> Option<u64> {
        match self.state {
            ViewState::Editing { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn cancel_edit(&mut self) {
        if matches!(self.state, ViewState::Editing { .. }) {
            self.state = ViewState::Idle;
        }
    }

    /// Submit the buffer. On failure the buffer stays as the user left it.
    pub fn save_edit(&mut self) -> bool {
        let ViewState::Editing { id, buffer } = &self.state else {
            return false;
        };
        let id = *id;
        match self.service.update(id, buffer.to_input()) {
            Ok(_) => {
                self.reload();
                self.ui
                    .alert(Alert::Success("Cliente atualizado com sucesso!".to_string()));
                true
            }
            Err(e) => {
                self.fail("could not update cliente", &e);
                false
            }
        }
    }

    pub fn create(&mut self, input: ClienteInput) -> bool {
        match self.service.create(input) {
            Ok(_) => {
                self.reload();
                self.ui
                    .alert(Alert::Success("Cliente criado com sucesso!".to_string()));
                true
            }
            Err(e) => {
                self.fail("could not create cliente", &e);
                false
            }
        }
    }

    /// Create a randomized test cliente.
    pub fn create_sample(&mut self) -> bool {
        let today = Local::now().date_naive();
        let stamp = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let input = sample_cliente(&mut rand::rng(), today, stamp);
        info!(nome = %input.nome, "creating sample cliente");
        self.create(input)
    }

    /// Delete after the user confirms; declining sends nothing.
    pub fn delete(&mut self, id: u64) -> bool {
        if !self.ui.confirm(DELETE_PROMPT) {
            info!(id, "delete cancelled");
            return false;
        }
        match self.service.delete(id) {
            Ok(_) => {
                self.reload();
                self.ui
                    .alert(Alert::Success("Cliente excluído com sucesso!".to_string()));
                true
            }
            Err(e) => {
                self.fail("could not delete cliente", &e);
                false
            }
        }
    }

    pub fn set_status(&mut self, id: u64, status: ClienteStatus) -> bool {
        match self.service.set_status(id, status) {
            Ok(_) => {
                self.reload();
                self.ui
                    .alert(Alert::Success(format!("Status do cliente alterado para {status}")));
                true
            }
            Err(e) => {
                self.fail("could not change cliente status", &e);
                false
            }
        }
    }

    pub fn render(&self) -> String {
        match &self.state {
            ViewState::Loading => LOADING.to_string(),
            ViewState::Failed { message } => message.clone(),
            ViewState::Idle => render_table(&self.clientes, None),
            ViewState::Editing { id, buffer } => render_table(&self.clientes, Some((*id, buffer))),
        }
    }

    fn fail(&self, context: &str, err: &ApiError) {
        error!(error = %err, "{context}");
        self.ui.alert(Alert::Error(format!("Erro: {err}")));
    }
}

/// Text table of clientes. The row being edited shows the buffer and is
/// marked with `*`.
pub fn render_table(clientes: &[Cliente], editing: Option<(u64, &EditBuffer)>) -> String {
    let rows: Vec<[String; 7]> = clientes
        .iter()
        .map(|c| match editing {
            Some((id, buffer)) if id == c.id => [
                format!("*{}", c.id),
                buffer.nome.clone(),
                buffer.email.clone(),
                buffer.cpf.clone(),
                buffer.status.to_string(),
                buffer.data_nascimento.clone(),
                format_date_display(c.data_inclusao.as_deref()),
            ],
            _ => [
                c.id.to_string(),
                c.nome.clone(),
                c.email.clone(),
                format_cpf(&c.cpf),
                c.status.to_string(),
                format_date_display(c.data_nascimento.as_deref()),
                format_date_display(c.data_inclusao.as_deref()),
            ],
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let header: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    let rule_width = widths.iter().sum::<usize>() + 3 * (widths.len() - 1);
    let mut out = vec![line(header.as_slice()), "-".repeat(rule_width)];
    if rows.is_empty() {
        out.push(EMPTY_LIST.to_string());
    }
    out.extend(rows.iter().map(|row| line(row.as_slice())));
    out.join("\n")
}
