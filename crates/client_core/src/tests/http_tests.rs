use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shared::error::ErrorBody;
use tokio::{net::TcpListener, sync::Mutex};

use super::*;

#[derive(Clone, Default)]
struct PhonebookState {
    persons: Arc<Mutex<Vec<Person>>>,
    next_id: Arc<Mutex<i64>>,
}

type ErrorResponse = (StatusCode, Json<ErrorBody>);

fn error_response(status: StatusCode, message: &str) -> ErrorResponse {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

async fn list_persons(State(state): State<PhonebookState>) -> Json<Vec<Person>> {
    Json(state.persons.lock().await.clone())
}

async fn create_person(
    State(state): State<PhonebookState>,
    Json(body): Json<NewPerson>,
) -> Result<(StatusCode, Json<Person>), ErrorResponse> {
    if body.number.len() < 8 {
        return Err(error_response(StatusCode::BAD_REQUEST, "number too short"));
    }
    let id = {
        let mut next_id = state.next_id.lock().await;
        *next_id += 1;
        *next_id
    };
    let created = Person::new(id, body.name, body.number);
    state.persons.lock().await.push(created.clone());
    Ok((StatusCode::CREATED, Json(created)))
}

// Mirrors a document-store backend: unknown ids answer `200 null`, except the
// literal id "gone" which gets a proper 404.
async fn update_person(
    State(state): State<PhonebookState>,
    Path(id): Path<String>,
    Json(body): Json<Person>,
) -> Result<Json<Option<Person>>, ErrorResponse> {
    if id == "gone" {
        return Err(error_response(StatusCode::NOT_FOUND, "unknown id"));
    }
    let mut persons = state.persons.lock().await;
    let updated = persons
        .iter_mut()
        .find(|p| p.id.to_string() == id)
        .map(|slot| {
            slot.number = body.number.clone();
            slot.clone()
        });
    Ok(Json(updated))
}

async fn delete_person(State(state): State<PhonebookState>, Path(id): Path<String>) -> StatusCode {
    let mut persons = state.persons.lock().await;
    let before = persons.len();
    persons.retain(|p| p.id.to_string() != id);
    if persons.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

fn phonebook_router(state: PhonebookState) -> Router {
    Router::new()
        .route("/api/persons", get(list_persons).post(create_person))
        .route(
            "/api/persons/:id",
            axum::routing::put(update_person).delete(delete_person),
        )
        .with_state(state)
}

async fn spawn_server(app: Router) -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

async fn spawn_phonebook(persons: Vec<Person>) -> anyhow::Result<(String, PhonebookState)> {
    let state = PhonebookState {
        persons: Arc::new(Mutex::new(persons)),
        next_id: Arc::new(Mutex::new(10)),
    };
    let url = spawn_server(phonebook_router(state.clone())).await?;
    Ok((url, state))
}

#[tokio::test]
async fn fetch_all_accepts_string_and_integer_ids() {
    let app = Router::new().route(
        "/api/persons",
        get(|| async {
            Json(serde_json::json!([
                {"id": 1, "name": "Ada", "number": "111"},
                {"id": "65a1f0", "name": "Bo", "number": "333"}
            ]))
        }),
    );
    let url = spawn_server(app).await.expect("server");
    let service = HttpPersonService::new(&url).expect("service");

    let persons = service.fetch_all().await.expect("fetch");

    assert_eq!(
        persons,
        vec![
            Person::new(1_i64, "Ada", "111"),
            Person::new(PersonId::new("65a1f0"), "Bo", "333"),
        ]
    );
}

#[tokio::test]
async fn create_returns_server_assigned_person() {
    let (url, state) = spawn_phonebook(Vec::new()).await.expect("server");
    let service = HttpPersonService::new(&url).expect("service");

    let created = service
        .create(NewPerson::new("Bo", "040-1234567"))
        .await
        .expect("create");

    assert_eq!(created, Person::new(11_i64, "Bo", "040-1234567"));
    assert_eq!(state.persons.lock().await.clone(), vec![created]);
}

#[tokio::test]
async fn create_maps_error_body_to_validation() {
    let (url, state) = spawn_phonebook(Vec::new()).await.expect("server");
    let service = HttpPersonService::new(&url).expect("service");

    let err = service
        .create(NewPerson::new("Bo", "333"))
        .await
        .expect_err("should be rejected");

    assert_eq!(err, ServiceError::validation("number too short"));
    assert!(state.persons.lock().await.is_empty());
}

#[tokio::test]
async fn update_replaces_number() {
    let ada = Person::new(PersonId::new("1"), "Ada", "111");
    let (url, state) = spawn_phonebook(vec![ada.clone()]).await.expect("server");
    let service = HttpPersonService::new(&url).expect("service");

    let updated = service
        .update_by_id(&ada.id, ada.with_number("222"))
        .await
        .expect("update");

    assert_eq!(updated.number, "222");
    assert_eq!(state.persons.lock().await[0].number, "222");
}

#[tokio::test]
async fn update_null_body_maps_to_not_found() {
    let (url, _) = spawn_phonebook(Vec::new()).await.expect("server");
    let service = HttpPersonService::new(&url).expect("service");
    let stale = Person::new(PersonId::new("7"), "Ada", "111");

    let err = service
        .update_by_id(&stale.id, stale.with_number("222"))
        .await
        .expect_err("should be missing");

    assert_eq!(err, ServiceError::not_found(PersonId::new("7")));
}

#[tokio::test]
async fn update_404_maps_to_not_found() {
    let (url, _) = spawn_phonebook(Vec::new()).await.expect("server");
    let service = HttpPersonService::new(&url).expect("service");
    let stale = Person::new(PersonId::new("gone"), "Ada", "111");

    let err = service
        .update_by_id(&stale.id, stale.clone())
        .await
        .expect_err("should be missing");

    assert!(err.is_not_found());
}

#[tokio::test]
async fn delete_succeeds_then_reports_not_found() {
    let ada = Person::new(PersonId::new("1"), "Ada", "111");
    let (url, state) = spawn_phonebook(vec![ada.clone()]).await.expect("server");
    let service = HttpPersonService::new(&url).expect("service");

    service.delete_by_id(&ada.id).await.expect("delete");
    assert!(state.persons.lock().await.is_empty());

    let err = service
        .delete_by_id(&ada.id)
        .await
        .expect_err("second delete");
    assert_eq!(err, ServiceError::not_found(PersonId::new("1")));
}

#[tokio::test]
async fn server_error_maps_to_transport() {
    let app = Router::new().route(
        "/api/persons",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database offline") }),
    );
    let url = spawn_server(app).await.expect("server");
    let service = HttpPersonService::new(&url).expect("service");

    let err = service.fetch_all().await.expect_err("should fail");

    assert_eq!(err, ServiceError::transport("database offline"));
}

#[tokio::test]
async fn unreachable_server_maps_to_transport() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let service = HttpPersonService::with_timeout(
        &format!("http://{addr}"),
        Some(std::time::Duration::from_secs(2)),
    )
    .expect("service");

    let err = service.fetch_all().await.expect_err("should fail");

    assert!(matches!(err, ServiceError::Transport(_)));
}

#[tokio::test]
async fn base_url_with_path_prefix_is_honoured() {
    let (_, state) = spawn_phonebook(Vec::new()).await.expect("server");
    let app = Router::new().nest("/phonebook", phonebook_router(state.clone()));
    let url = spawn_server(app).await.expect("server");
    let service = HttpPersonService::new(&format!("{url}/phonebook/")).expect("service");

    service
        .create(NewPerson::new("Bo", "040-1234567"))
        .await
        .expect("create");

    assert_eq!(service.fetch_all().await.expect("fetch").len(), 1);
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
struct NumericPerson {
    id: i64,
    name: String,
    number: String,
}

// A backend whose records are typed: a string id in the body is a 422.
#[tokio::test]
async fn integer_ids_are_sent_back_as_integers() {
    let store = Arc::new(Mutex::new(vec![NumericPerson {
        id: 1,
        name: "Ada".to_string(),
        number: "111".to_string(),
    }]));
    let app = Router::new()
        .route(
            "/api/persons",
            get(|State(store): State<Arc<Mutex<Vec<NumericPerson>>>>| async move {
                Json(store.lock().await.clone())
            }),
        )
        .route(
            "/api/persons/:id",
            axum::routing::put(
                |State(store): State<Arc<Mutex<Vec<NumericPerson>>>>,
                 Path(id): Path<i64>,
                 Json(body): Json<NumericPerson>| async move {
                    let mut persons = store.lock().await;
                    let slot = persons.iter_mut().find(|p| p.id == id && p.id == body.id);
                    Json(slot.map(|slot| {
                        slot.number = body.number;
                        slot.clone()
                    }))
                },
            ),
        )
        .with_state(store.clone());
    let url = spawn_server(app).await.expect("server");
    let service = HttpPersonService::new(&url).expect("service");

    let ada = service.fetch_all().await.expect("fetch").remove(0);
    let updated = service
        .update_by_id(&ada.id, ada.with_number("222"))
        .await
        .expect("update");

    assert_eq!(updated, Person::new(1_i64, "Ada", "222"));
    assert_eq!(store.lock().await[0].number, "222");
}

#[tokio::test]
async fn ids_are_escaped_into_a_single_path_segment() {
    let odd = Person::new(PersonId::new("a/b?c#d"), "Ada", "111");
    let (url, state) = spawn_phonebook(vec![odd.clone()]).await.expect("server");
    let service = HttpPersonService::new(&url).expect("service");

    let updated = service
        .update_by_id(&odd.id, odd.with_number("222"))
        .await
        .expect("update");
    assert_eq!(updated.number, "222");

    service.delete_by_id(&odd.id).await.expect("delete");
    assert!(state.persons.lock().await.is_empty());
}

#[tokio::test]
async fn rejects_invalid_base_urls() {
    assert!(HttpPersonService::new("not a url").is_err());
    assert!(HttpPersonService::new("ftp://example.com").is_err());
    assert!(HttpPersonService::new("mailto:phonebook@example.com").is_err());
    assert!(HttpPersonService::new("http://localhost:3001").is_ok());
}
