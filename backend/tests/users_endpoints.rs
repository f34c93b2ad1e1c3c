//! End-to-end exercise of the users REST surface through the public crate
//! API, with an in-memory repository standing in for the document store.

use std::sync::{Arc, Mutex};

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};

use backend::domain::ports::{UserRepository, UserStoreError};
use backend::domain::{EmailAddress, NewUser, Page, User, UserId, UserPatch};
use backend::inbound::http::HttpState;
use backend::inbound::http::users::{
    create_user, delete_user, find_user_by_email, get_user, list_users, update_user,
};

#[derive(Default)]
struct MemoryStore {
    users: Mutex<Vec<User>>,
    serial: Mutex<u64>,
}

impl MemoryStore {
    fn next_id(&self) -> UserId {
        let mut serial = self.serial.lock().expect("serial lock");
        *serial += 1;
        UserId::new(format!("{:024x}", *serial)).expect("serial ids are valid hex")
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, UserStoreError> {
        let id = self.next_id();
        let mut users = self.users.lock().expect("users lock");
        if users.iter().any(|u| u.email() == user.email()) {
            return Err(UserStoreError::conflict(
                "a user with this email already exists",
            ));
        }
        let (name, email, age) = user.into_parts();
        let created = User::new(id, name, email, age, Utc::now());
        users.push(created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: &UserId) -> Result<User, UserStoreError> {
        self.users
            .lock()
            .expect("users lock")
            .iter()
            .find(|u| u.id() == id)
            .cloned()
            .ok_or_else(|| UserStoreError::not_found(id.as_ref()))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserStoreError> {
        Ok(self
            .users
            .lock()
            .expect("users lock")
            .iter()
            .find(|u| u.email() == email)
            .cloned())
    }

    async fn list(&self, page: Page) -> Result<Vec<User>, UserStoreError> {
        let users = self.users.lock().expect("users lock");
        let limit = usize::try_from(page.limit()).expect("limit fits usize");
        let offset = usize::try_from(page.offset()).expect("offset fits usize");
        Ok(users.iter().skip(offset).take(limit).cloned().collect())
    }

    async fn update(&self, id: &UserId, patch: UserPatch) -> Result<u64, UserStoreError> {
        let mut users = self.users.lock().expect("users lock");
        let Some(user) = users.iter_mut().find(|u| u.id() == id) else {
            return Ok(0);
        };
        let replacement = User::new(
            user.id().clone(),
            patch.name().cloned().unwrap_or_else(|| user.name().clone()),
            patch
                .email()
                .cloned()
                .unwrap_or_else(|| user.email().clone()),
            patch.age().or(user.age()),
            user.created_at(),
        );
        let modified = u64::from(replacement != *user);
        *user = replacement;
        Ok(modified)
    }

    async fn delete(&self, id: &UserId) -> Result<u64, UserStoreError> {
        let mut users = self.users.lock().expect("users lock");
        let before = users.len();
        users.retain(|u| u.id() != id);
        Ok(u64::try_from(before - users.len()).expect("count fits u64"))
    }
}

async fn read_json(response: actix_web::dev::ServiceResponse) -> Value {
    let body = actix_test::read_body(response).await;
    serde_json::from_slice(&body).expect("JSON body")
}

#[actix_web::test]
async fn full_user_lifecycle_over_http() {
    let state = web::Data::new(HttpState::new(Arc::new(MemoryStore::default())));
    let app = actix_test::init_service(
        App::new().service(
            web::scope("/api/v1")
                .app_data(state)
                .service(create_user)
                .service(list_users)
                .service(find_user_by_email)
                .service(get_user)
                .service(update_user)
                .service(delete_user),
        ),
    )
    .await;

    // Create Alice.
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(json!({ "name": "Alice", "email": "a@x.com" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json(response).await;
    let id = created
        .get("id")
        .and_then(Value::as_str)
        .expect("created id")
        .to_owned();

    // She is listed and fetchable by id and email.
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/users").to_request(),
    )
    .await;
    let listed = read_json(response).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users/search/by-email/a@x.com")
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Rename to Alicia; the email is untouched.
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/users/{id}"))
            .set_json(json!({ "name": "Alicia" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = read_json(response).await;
    assert_eq!(updated.get("name").and_then(Value::as_str), Some("Alicia"));
    assert_eq!(updated.get("email").and_then(Value::as_str), Some("a@x.com"));

    // Delete, after which the id no longer resolves.
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/users/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/users/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
