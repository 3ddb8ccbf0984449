use std::time::Duration;

pub trait Configuration: Clone + Send + Sync + 'static {
    fn port(&self) -> String;
    fn database_url(&self) -> Option<String>;
    fn firebase_project_id(&self) -> Option<String>;
    fn stripe_secret_key(&self) -> Option<String>;
    fn request_timeout(&self) -> Duration;
}
