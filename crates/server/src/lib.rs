use db::{DatabaseConnection, DbService};
use services::services::ai::AiService;
use services::services::auth::AuthService;
use services::services::task::TaskService;

pub mod error;
pub mod http;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    db: DbService,
    auth: AuthService,
    ai: AiService,
    tasks: TaskService,
}

impl AppState {
    pub fn new(db: DbService, auth: AuthService, ai: AiService) -> Self {
        let tasks = TaskService::new(ai.clone());
        Self { db, auth, ai, tasks }
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.db.conn
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn ai(&self) -> &AiService {
        &self.ai
    }

    pub fn tasks(&self) -> &TaskService {
        &self.tasks
    }
}
