use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use campus_auth::auth_routes;

use crate::{
    handlers::{
        addresses::{create_address, delete_address, get_address, list_addresses, update_address},
        attendance::{
            create_attendance, delete_attendance, get_attendance, list_attendance,
            update_attendance,
        },
        disciplinary_actions::{
            create_disciplinary_action, delete_disciplinary_action, get_disciplinary_action,
            list_disciplinary_actions, update_disciplinary_action,
        },
        health::livez,
        health_safety::{
            create_health_safety, delete_health_safety, get_health_safety, list_health_safety,
            update_health_safety,
        },
        register::{register_student, register_user},
        student_behaviors::{
            create_student_behavior, delete_student_behavior, get_student_behavior,
            list_student_behaviors, update_student_behavior,
        },
        terms::{create_term, delete_term, get_term, list_terms, update_term},
        users::{delete_user, get_user},
    },
    state::AppState,
};

/// Builds the router.
///
/// Record routes share one path per entity: `POST /{entity}/{owner_id}`
/// creates under an owner, the other methods on the same path address a
/// record by its own id.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let api_routes = Router::new()
        .route("/register", post(register_user))
        .route("/register/student", post(register_student))
        .route("/users/{id}", get(get_user).delete(delete_user))
        .route(
            "/attendance/{id}",
            post(create_attendance)
                .get(get_attendance)
                .put(update_attendance)
                .delete(delete_attendance),
        )
        .route("/attendance/user/{user_id}", get(list_attendance))
        .route(
            "/health-safety/{id}",
            post(create_health_safety)
                .get(get_health_safety)
                .put(update_health_safety)
                .delete(delete_health_safety),
        )
        .route("/health-safety/user/{user_id}", get(list_health_safety))
        .route(
            "/disciplinary-actions/{id}",
            post(create_disciplinary_action)
                .get(get_disciplinary_action)
                .put(update_disciplinary_action)
                .delete(delete_disciplinary_action),
        )
        .route(
            "/disciplinary-actions/student/{student_id}",
            get(list_disciplinary_actions),
        )
        .route(
            "/student-behaviors/{id}",
            post(create_student_behavior)
                .get(get_student_behavior)
                .put(update_student_behavior)
                .delete(delete_student_behavior),
        )
        .route(
            "/student-behaviors/student/{student_id}",
            get(list_student_behaviors),
        )
        .route("/terms", get(list_terms).post(create_term))
        .route(
            "/terms/{id}",
            get(get_term).put(update_term).delete(delete_term),
        )
        .route(
            "/addresses/{id}",
            post(create_address)
                .get(get_address)
                .put(update_address)
                .delete(delete_address),
        )
        .route("/addresses/user/{user_id}", get(list_addresses))
        .merge(auth_routes().with_state(state.auth.clone()));

    Router::new()
        .route("/health/livez", get(livez))
        .merge(api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}
