use axum::response::Html;

const DASHBOARD: &str = include_str!("dashboard.html");

pub async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD)
}
