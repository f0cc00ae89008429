//! Full cliente lifecycle against the live mock backend.
//!
//! # Design
//! Starts the mock server on a random port, then drives the list view, the
//! service, and the transport wrapper over real HTTP with `UreqTransport`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use clientes_core::{
    Alert, ApiClient, ApiError, ClienteFilter, ClienteInput, ClienteListView, ClienteService,
    ClienteStatus, Navigator, Session, Ui, UreqTransport, ViewState,
};

/// Start the mock backend on its own runtime thread and return its base URL.
fn start_backend(token: Option<&'static str>) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            let app = match token {
                Some(token) => mock_server::app_with_token(token),
                None => mock_server::app(),
            };
            mock_server::serve(listener, app).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

struct ScriptedUi {
    confirm: Cell<bool>,
    alerts: RefCell<Vec<Alert>>,
}

impl ScriptedUi {
    fn new() -> Self {
        Self {
            confirm: Cell::new(true),
            alerts: RefCell::new(Vec::new()),
        }
    }

    fn last_alert(&self) -> Option<Alert> {
        self.alerts.borrow().last().cloned()
    }
}

impl Ui for ScriptedUi {
    fn confirm(&self, _message: &str) -> bool {
        self.confirm.get()
    }

    fn alert(&self, alert: Alert) {
        self.alerts.borrow_mut().push(alert);
    }
}

#[derive(Default)]
struct RecordingNavigator(RefCell<Vec<String>>);

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.0.borrow_mut().push(route.to_string());
    }
}

fn view<'a>(
    base_url: &str,
    session: Session,
    ui: &'a ScriptedUi,
) -> ClienteListView<UreqTransport, &'a ScriptedUi> {
    let transport = UreqTransport::new(Duration::from_secs(5));
    let service = ClienteService::new(ApiClient::new(base_url, transport, session));
    ClienteListView::new(service, ui)
}

fn maria() -> ClienteInput {
    ClienteInput {
        nome: "Maria Silva".to_string(),
        email: "maria@email.com".to_string(),
        cpf: "98765432100".to_string(),
        status: None,
        data_nascimento: Some("1985-05-15".into()),
    }
}

#[test]
fn crud_lifecycle() {
    let base_url = start_backend(None);
    let ui = ScriptedUi::new();
    let mut view = view(&base_url, Session::anonymous(), &ui);

    // Step 1: mount — empty list.
    assert!(view.mount());
    assert_eq!(view.state(), &ViewState::Idle);
    assert!(view.render().contains("Nenhum cliente cadastrado"));

    // Step 2: create Maria; the reloaded table shows the formatted CPF.
    assert!(view.create(maria()));
    assert_eq!(
        ui.last_alert(),
        Some(Alert::Success("Cliente criado com sucesso!".to_string()))
    );
    let rendered = view.render();
    assert!(rendered.contains("Maria Silva"), "{rendered}");
    assert!(rendered.contains("987.654.321-00"), "{rendered}");
    assert!(rendered.contains("15/05/1985"), "{rendered}");

    // Step 3: lookup by punctuated CPF.
    let id = view.service().get_by_cpf("987.654.321-00").unwrap().id;

    // Step 4: a sample record joins the list.
    assert!(view.create_sample());
    assert_eq!(view.clientes().len(), 2);

    // Step 5: inline edit and save.
    assert!(view.begin_edit(id));
    assert_eq!(view.edit_buffer_mut().unwrap().data_nascimento, "1985-05-15");
    view.edit_buffer_mut().unwrap().nome = "Maria S. Silva".to_string();
    assert!(view.save_edit());
    assert_eq!(view.state(), &ViewState::Idle);
    let saved = view.clientes().iter().find(|c| c.id == id).unwrap();
    assert_eq!(saved.nome, "Maria S. Silva");

    // Step 6: a 10-digit CPF is rejected locally; the buffer survives.
    assert!(view.begin_edit(id));
    view.edit_buffer_mut().unwrap().cpf = "987.654.321-0".to_string();
    assert!(!view.save_edit());
    assert!(matches!(ui.last_alert(), Some(Alert::Error(_))));
    assert_eq!(view.editing_id(), Some(id));
    assert_eq!(view.edit_buffer_mut().unwrap().cpf, "987.654.321-0");
    let unchanged = view.service().get_by_id(id).unwrap();
    assert_eq!(unchanged.cpf, "98765432100");

    // Step 7: cancel.
    view.cancel_edit();
    assert_eq!(view.state(), &ViewState::Idle);

    // Step 8: email availability ignores the record's own address.
    let service = view.service();
    assert!(!service.check_email_available("maria@email.com", None).unwrap());
    assert!(service.check_email_available("maria@email.com", Some(id)).unwrap());

    // Step 9: status patch, then filter.
    assert!(view.set_status(id, ClienteStatus::Inativo));
    let inactive = view
        .service()
        .filter(&ClienteFilter {
            nome: Some("maria s.".to_string()),
            status: Some(ClienteStatus::Inativo),
            email: None,
        })
        .unwrap();
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0].id, id);

    // Step 10: declined delete leaves everything in place.
    ui.confirm.set(false);
    assert!(!view.delete(id));
    assert_eq!(view.clientes().len(), 2);
    assert!(view.service().get_by_id(id).is_ok());

    // Step 11: confirmed delete.
    ui.confirm.set(true);
    assert!(view.delete(id));
    assert_eq!(view.clientes().len(), 1);
    assert!(matches!(view.service().get_by_id(id), Err(ApiError::NotFound)));
}

#[test]
fn duplicate_cpf_is_reported_by_the_backend() {
    let base_url = start_backend(None);
    let ui = ScriptedUi::new();
    let mut view = view(&base_url, Session::anonymous(), &ui);
    assert!(view.mount());

    assert!(view.create(maria()));
    let again = ClienteInput {
        email: "outra@email.com".to_string(),
        ..maria()
    };
    assert!(!view.create(again));
    match ui.last_alert() {
        Some(Alert::Error(message)) => assert!(message.contains("409"), "{message}"),
        other => panic!("unexpected alert: {other:?}"),
    }
    assert_eq!(view.clientes().len(), 1);
}

#[test]
fn unauthorized_redirects_to_login() {
    let base_url = start_backend(Some("s3cret"));
    let ui = ScriptedUi::new();
    let navigator = Rc::new(RecordingNavigator::default());

    let session = Session::anonymous().navigator(navigator.clone());
    let mut anonymous = view(&base_url, session, &ui);
    assert!(!anonymous.mount());
    assert!(matches!(anonymous.state(), ViewState::Failed { .. }));
    assert_eq!(*navigator.0.borrow(), vec!["/login".to_string()]);

    let session = Session::with_token("s3cret").navigator(navigator.clone());
    let mut authorized = view(&base_url, session, &ui);
    assert!(authorized.mount());
    assert_eq!(navigator.0.borrow().len(), 1);
}

#[test]
fn unreachable_backend_fails_the_load() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let base_url = format!("http://127.0.0.1:{port}");
    let ui = ScriptedUi::new();
    let mut view = view(&base_url, Session::anonymous(), &ui);

    assert!(!view.mount());
    assert_eq!(
        view.render(),
        "Erro ao carregar clientes. Verifique se o backend está rodando."
    );
    assert!(matches!(
        view.service().list_all(),
        Err(ApiError::NoResponse { .. })
    ));
}
