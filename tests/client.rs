use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{rt, web, App, HttpServer};
use dotenv::dotenv;
use sqlx::PgPool;
use std::net::TcpListener;
use taskflow::auth::{AuthMiddleware, TokenKeys};
use taskflow::client::{
    ClientConfig, ClientError, CompletedChoice, SessionController, TaskDraft,
};
use taskflow::client::view::{self, TaskCounts};
use taskflow::models::TaskPriority;
use taskflow::routes;

async fn live_pool() -> PgPool {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

async fn cleanup_user(pool: &PgPool, email: &str) {
    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await;
}

/// Boots the real server on a random port and returns its API base URL.
fn spawn_server(pool: PgPool) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let server_pool = pool;
    rt::spawn(async move {
        HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(server_pool.clone()))
                .app_data(web::Data::new(TokenKeys::new("test-secret")))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(Logger::default())
                .service(routes::health::health)
                .service(
                    web::scope("/api")
                        .wrap(AuthMiddleware)
                        .configure(routes::config),
                )
        })
        .bind(("127.0.0.1", port))
        .unwrap_or_else(|_| panic!("Failed to bind to port {}", port))
        .run()
        .await
    });

    format!("http://127.0.0.1:{}/api", port)
}

#[actix_rt::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_session_controller_end_to_end() {
    let pool = live_pool().await;
    let email = "client_e2e@example.com";
    cleanup_user(&pool, email).await;

    let base_url = spawn_server(pool.clone());
    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    let mut controller = SessionController::new(ClientConfig {
        base_url: base_url.clone(),
    });
    assert!(!controller.is_authenticated());

    // Register and end up signed in.
    controller
        .register("Client User", email, "Password123!")
        .await
        .expect("registration should succeed");
    assert!(controller.is_authenticated());
    assert_eq!(controller.current_user().unwrap().email, email);
    let token = controller.token().unwrap().to_owned();

    // Create a task through the controller; the returned list is the
    // server's copy, already refreshed.
    let draft = TaskDraft {
        title: "Buy milk".to_string(),
        description: None,
        priority: TaskPriority::Low,
        due_date: None,
        completed: CompletedChoice::No,
    };
    let tasks = controller.create_task(&draft).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(!tasks[0].completed);

    // Toggle complete and observe the refreshed list and the view math.
    let tasks = controller.set_completed(tasks[0].id, true).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].completed);
    let counts = TaskCounts::tally(&tasks);
    assert_eq!(counts.productivity(), 100);
    assert!(view::pending(&tasks).is_empty());

    // A fresh controller can resume from the cached credential.
    let mut resumed = SessionController::new(ClientConfig {
        base_url: base_url.clone(),
    });
    resumed.resume(token).await.expect("resume should succeed");
    assert_eq!(resumed.current_user().unwrap().email, email);

    // Resuming a garbage credential clears the cache and reports expiry.
    let mut rejected = SessionController::new(ClientConfig { base_url });
    match rejected.resume("not.a.token".to_string()).await {
        Err(ClientError::SessionExpired) => {}
        other => panic!("expected SessionExpired, got {:?}", other.map(|_| ())),
    }
    assert!(!rejected.is_authenticated());

    controller.logout();
    assert!(!controller.is_authenticated());

    cleanup_user(&pool, email).await;
}
