use serde_json::{json, Value};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::net::TcpListener;
use taskboard::configuration::{get_configuration, DatabaseSettings};
use taskboard::startup::run;

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
}

async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();
    let connection_pool = configure_database(&configuration.database).await;

    let server = run(listener, connection_pool.clone(), configuration.auth.clone())
        .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        db_pool: connection_pool,
    }
}

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    let mut connection = PgConnection::connect(&config.connection_string_without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");

    let connection_pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database.");
    connection_pool
}

/// Sign up a fresh user and return their access token.
async fn access_token_for(app: &TestApp, email: &str, username: &str) -> String {
    let response = reqwest::Client::new()
        .post(&format!("{}/api/auth/signup", &app.address))
        .json(&json!({ "email": email, "username": username, "password": "Password123!" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    body["accessToken"].as_str().unwrap().to_string()
}

async fn create_task(app: &TestApp, token: &str, title: &str) -> Value {
    let response = reqwest::Client::new()
        .post(&format!("{}/api/tasks", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "title": title }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());
    response.json().await.unwrap()
}

#[tokio::test]
async fn tasks_require_authentication() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .get(&format!("{}/api/tasks", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "MISSING_ACCESS_TOKEN");
}

#[tokio::test]
async fn create_and_list_tasks() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "u@x.com", "u_user").await;
    let client = reqwest::Client::new();

    let body = create_task(&app, &token, "Buy milk").await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["task"]["title"], "Buy milk");
    assert_eq!(body["task"]["completed"], false);

    create_task(&app, &token, "Walk the dog").await;

    let response = client
        .get(&format!("{}/api/tasks", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["tasks"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn create_task_rejects_empty_title() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "u@x.com", "u_user").await;

    let response = reqwest::Client::new()
        .post(&format!("{}/api/tasks", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "title": "   " }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn update_task_and_filter_by_completion() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "u@x.com", "u_user").await;
    let client = reqwest::Client::new();

    let body = create_task(&app, &token, "Buy milk").await;
    let task_id = body["task"]["id"].as_str().unwrap().to_string();
    create_task(&app, &token, "Walk the dog").await;

    let response = client
        .patch(&format!("{}/api/tasks/{}", &app.address, task_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "completed": true }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["task"]["completed"], true);
    // Untouched fields survive the partial update
    assert_eq!(body["task"]["title"], "Buy milk");

    let response = client
        .get(&format!("{}/api/tasks?completed=true", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to execute request.");
    let body: Value = response.json().await.unwrap();
    let tasks = body["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], task_id.as_str());
}

#[tokio::test]
async fn delete_task_then_404() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "u@x.com", "u_user").await;
    let client = reqwest::Client::new();

    let body = create_task(&app, &token, "Buy milk").await;
    let task_id = body["task"]["id"].as_str().unwrap().to_string();

    let response = client
        .delete(&format!("{}/api/tasks/{}", &app.address, task_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());

    let response = client
        .get(&format!("{}/api/tasks/{}", &app.address, task_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(404, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "TASK_NOT_FOUND");
}

#[tokio::test]
async fn tasks_are_scoped_to_their_owner() {
    let app = spawn_app().await;
    let token_a = access_token_for(&app, "a@x.com", "user_a").await;
    let token_b = access_token_for(&app, "b@x.com", "user_b").await;
    let client = reqwest::Client::new();

    let body = create_task(&app, &token_a, "A's task").await;
    let task_id = body["task"]["id"].as_str().unwrap().to_string();

    // User B cannot see, update, or delete A's task
    let response = client
        .get(&format!("{}/api/tasks/{}", &app.address, task_id))
        .header("Authorization", format!("Bearer {}", token_b))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(404, response.status().as_u16());

    let response = client
        .delete(&format!("{}/api/tasks/{}", &app.address, task_id))
        .header("Authorization", format!("Bearer {}", token_b))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(404, response.status().as_u16());

    let response = client
        .get(&format!("{}/api/tasks", &app.address))
        .header("Authorization", format!("Bearer {}", token_b))
        .send()
        .await
        .expect("Failed to execute request.");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["tasks"].as_array().unwrap().len(), 0);
}
