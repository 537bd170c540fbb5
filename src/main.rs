//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não
    // deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let lead_routes = Router::new()
        // CRUD básico
        .route("/"
               ,post(handlers::leads::create_lead)
               .get(handlers::leads::list_leads)
        )
        // Distribuição (caminhos estáticos antes dos capturados)
        .route("/assign", post(handlers::assignment::direct_assign))
        .route("/assign/auto", post(handlers::assignment::auto_distribute))
        .route("/assign/manual-map", post(handlers::assignment::assign_manual))
        .route("/due", get(handlers::assignment::list_due))
        .route("/reassign-due", post(handlers::assignment::reassign_due))
        // Ciclo de vida individual
        .route("/{id}"
               ,get(handlers::leads::get_lead)
               .delete(handlers::leads::delete_lead)
        )
        .route("/{id}/status", put(handlers::leads::update_status))
        .route("/{id}/reactivate", post(handlers::leads::reactivate))
        .route("/{id}/note", post(handlers::leads::add_note))
        .route("/{id}/call", post(handlers::leads::log_call))
        .route("/{id}/assignments", get(handlers::leads::assignment_history))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let pipeline_routes = Router::new()
        .route("/"
               ,post(handlers::pipelines::create_pipeline)
               .get(handlers::pipelines::list_pipelines)
        )
        .route("/{id}/stages"
               ,post(handlers::pipelines::add_stage)
               .get(handlers::pipelines::list_stages)
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let analytics_routes = Router::new()
        .route("/summary", get(handlers::analytics::summary))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/leads", lead_routes)
        .nest("/api/pipelines", pipeline_routes)
        .nest("/api/analytics", analytics_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
