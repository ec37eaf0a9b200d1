//! Line-oriented front-end.
//!
//! Plays the role of the pages: it parses one command per line, runs forms
//! through validation, calls the holders, navigates the router, and emits
//! the page-level notices (sign-in, sign-up, list failures). Rendering is
//! returned as lines so the binary prints them and the tests inspect them.

use std::sync::Arc;

use serde::Serialize;

use taskdesk_proto::UnknownVariant;
use taskdesk_proto::query::{SortKey, SortOrder, TaskQuery};
use taskdesk_proto::result::{AuthResult, OperationResult};
use taskdesk_proto::task::{Task, TaskId, TaskStatus};
use taskdesk_proto::user::User;

use crate::forms::{LoginForm, RegisterForm, TaskForm, ValidationFailed};
use crate::guards::{LOGIN_PATH, ROOT_PATH};
use crate::notify::Notifier;
use crate::provider::{DocumentStore, IdentityProvider};
use crate::router::{Navigation, Route, Router};
use crate::session::{SessionError, SessionHolder};
use crate::tasks::{LocalFilter, StatusFilter, TaskError, TaskHolder, TaskPatch};

/// Command reference printed by `help`.
pub const HELP: &str = "\
comandos:
  go <ruta>                         navegar (/, /create, /edit/<id>, /auth/login, /auth/register)
  register <email> <clave> [nombre] crear cuenta
  login <email> <clave>             iniciar sesión
  google                            iniciar sesión con Google
  logout                            cerrar sesión
  list [estado] [limit=N] [sort=createdAt|updatedAt|title] [order=asc|desc]
  filter <all|pending|in-progress|completed>
  search [texto]                    buscar en título y descripción
  show                              mostrar la lista filtrada
  get <#n|id>                       ver una tarea
  create <título> [| descripción]   nueva tarea
  rename <#n|id> <título>           cambiar título
  describe <#n|id> [texto]          cambiar descripción
  status <#n|id> <estado>           cambiar estado
  cycle <#n|id>                     avanzar estado
  delete <#n|id>                    eliminar tarea
  refresh | stats | whoami | help | quit";

/// Refers to a task by its position in the last listing or by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskRef {
    /// 1-based position in the last listing.
    Index(usize),
    /// Task id.
    Id(TaskId),
}

impl TaskRef {
    fn parse(token: &str) -> Self {
        token
            .trim_start_matches('#')
            .parse::<usize>()
            .ok()
            .filter(|_| token.starts_with('#') || token.bytes().all(|b| b.is_ascii_digit()))
            .map_or_else(|| Self::Id(TaskId::new(token)), Self::Index)
    }
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Navigate to a path.
    Go(String),
    /// Create an account.
    Register {
        /// Email.
        email: String,
        /// Password.
        password: String,
        /// Display name.
        name: String,
    },
    /// Sign in with email and password.
    Login {
        /// Email.
        email: String,
        /// Password.
        password: String,
    },
    /// Sign in with the federated provider.
    Google,
    /// Sign out.
    Logout,
    /// Fetch the task list; unset fields fall back to the configured defaults.
    List(TaskQuery),
    /// Set the page status filter.
    Filter(StatusFilter),
    /// Set the page search term.
    Search(String),
    /// Print the filtered local list.
    Show,
    /// Fetch and print one task.
    Get(TaskRef),
    /// Create a task.
    Create {
        /// Title.
        title: String,
        /// Description.
        description: String,
    },
    /// Change a title.
    Rename(TaskRef, String),
    /// Change a description.
    Describe(TaskRef, String),
    /// Set a status.
    Status(TaskRef, TaskStatus),
    /// Advance a status.
    Cycle(TaskRef),
    /// Delete a task.
    Delete(TaskRef),
    /// Re-fetch the list in the background.
    Refresh,
    /// Print counts.
    Stats,
    /// Print the session.
    Whoami,
    /// Print the command reference.
    Help,
    /// Leave.
    Quit,
}

/// A line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Blank line.
    #[error("línea vacía")]
    Empty,

    /// First word is not a command.
    #[error("comando desconocido: {0} (escribe 'help')")]
    Unknown(String),

    /// Arguments missing or malformed.
    #[error("uso: {0}")]
    Usage(&'static str),

    /// A value did not name a status, sort key or order.
    #[error(transparent)]
    Value(#[from] UnknownVariant),

    /// A number was expected.
    #[error("número inválido: {0}")]
    Number(String),
}

/// Splits off the first whitespace-delimited word.
fn first_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    s.split_once(char::is_whitespace)
        .map_or((s, ""), |(word, rest)| (word, rest.trim()))
}

fn required<'a>(s: &'a str, usage: &'static str) -> Result<&'a str, ParseError> {
    if s.is_empty() {
        Err(ParseError::Usage(usage))
    } else {
        Ok(s)
    }
}

fn parse_list_args(rest: &str) -> Result<TaskQuery, ParseError> {
    let mut query = TaskQuery::default();
    for token in rest.split_whitespace() {
        match token.split_once('=') {
            Some(("status", value)) => query.status = Some(value.parse()?),
            Some(("limit", value)) => {
                query.limit = Some(
                    value
                        .parse()
                        .map_err(|_| ParseError::Number(value.to_string()))?,
                );
            }
            Some(("sort", value)) => query.sort_by = Some(value.parse::<SortKey>()?),
            Some(("order", value)) => query.sort_order = Some(value.parse::<SortOrder>()?),
            Some(_) => return Err(ParseError::Usage("list [estado] [limit=N] [sort=..] [order=..]")),
            None => query.status = Some(token.parse()?),
        }
    }
    Ok(query)
}

/// Parses one input line.
///
/// # Errors
///
/// Returns [`ParseError`] for blank lines, unknown commands and malformed
/// arguments.
pub fn parse(line: &str) -> Result<Command, ParseError> {
    let (word, rest) = first_word(line);
    match word {
        "" => Err(ParseError::Empty),
        "go" => required(rest, "go <ruta>").map(|path| Command::Go(path.to_string())),
        "register" => {
            let (email, rest) = first_word(rest);
            let (password, name) = first_word(rest);
            required(password, "register <email> <clave> [nombre]")?;
            Ok(Command::Register {
                email: email.to_string(),
                password: password.to_string(),
                name: name.to_string(),
            })
        }
        "login" => {
            let (email, rest) = first_word(rest);
            let (password, extra) = first_word(rest);
            if password.is_empty() || !extra.is_empty() {
                return Err(ParseError::Usage("login <email> <clave>"));
            }
            Ok(Command::Login {
                email: email.to_string(),
                password: password.to_string(),
            })
        }
        "google" => Ok(Command::Google),
        "logout" => Ok(Command::Logout),
        "list" | "ls" => parse_list_args(rest).map(Command::List),
        "filter" => Ok(Command::Filter(if rest.is_empty() {
            StatusFilter::All
        } else {
            rest.parse()?
        })),
        "search" => Ok(Command::Search(rest.to_string())),
        "show" => Ok(Command::Show),
        "get" => required(rest, "get <#n|id>").map(|r| Command::Get(TaskRef::parse(r))),
        "create" | "new" => {
            let (title, description) = rest.split_once('|').unwrap_or((rest, ""));
            Ok(Command::Create {
                title: title.trim().to_string(),
                description: description.trim().to_string(),
            })
        }
        "rename" => {
            let (target, title) = first_word(rest);
            required(target, "rename <#n|id> <título>")?;
            Ok(Command::Rename(TaskRef::parse(target), title.to_string()))
        }
        "describe" => {
            let (target, text) = first_word(rest);
            required(target, "describe <#n|id> [texto]")?;
            Ok(Command::Describe(TaskRef::parse(target), text.to_string()))
        }
        "status" => {
            let (target, status) = first_word(rest);
            required(status, "status <#n|id> <estado>")?;
            Ok(Command::Status(TaskRef::parse(target), status.parse()?))
        }
        "cycle" => required(rest, "cycle <#n|id>").map(|r| Command::Cycle(TaskRef::parse(r))),
        "delete" | "rm" => {
            required(rest, "delete <#n|id>").map(|r| Command::Delete(TaskRef::parse(r)))
        }
        "refresh" => Ok(Command::Refresh),
        "stats" => Ok(Command::Stats),
        "whoami" => Ok(Command::Whoami),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(ParseError::Unknown(other.to_string())),
    }
}

/// Whether the loop keeps reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// Stop.
    Quit,
}

/// Display settings for the shell.
#[derive(Debug, Clone)]
pub struct ShellOptions {
    /// Parameters used by `list` and `refresh` where none are given.
    pub default_query: TaskQuery,
    /// chrono format for timestamps.
    pub timestamp_format: String,
    /// Print results as JSON envelopes.
    pub json: bool,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            default_query: TaskQuery::default(),
            timestamp_format: "%Y-%m-%d %H:%M".to_string(),
            json: false,
        }
    }
}

/// The front-end: holders, router and page state.
pub struct Shell<I, D> {
    session: SessionHolder<I>,
    tasks: Arc<TaskHolder<D>>,
    router: Router<I>,
    notifier: Notifier,
    options: ShellOptions,
    filter: LocalFilter,
    /// Ids in the order last printed, for `#n` references.
    listing: Vec<TaskId>,
}

impl<I, D> Shell<I, D>
where
    I: IdentityProvider,
    D: DocumentStore + 'static,
{
    /// Assembles a shell over existing holders.
    pub fn new(
        session: SessionHolder<I>,
        tasks: Arc<TaskHolder<D>>,
        router: Router<I>,
        notifier: Notifier,
        options: ShellOptions,
    ) -> Self {
        Self {
            session,
            tasks,
            router,
            notifier,
            options,
            filter: LocalFilter::default(),
            listing: Vec::new(),
        }
    }

    /// The session holder.
    #[must_use]
    pub const fn session(&self) -> &SessionHolder<I> {
        &self.session
    }

    /// The task holder.
    #[must_use]
    pub const fn tasks(&self) -> &Arc<TaskHolder<D>> {
        &self.tasks
    }

    /// The route currently rendered.
    #[must_use]
    pub fn current_route(&self) -> Option<Route> {
        self.router.current()
    }

    /// Opens the app at `/`.
    pub async fn start(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        self.go(ROOT_PATH, &mut out).await;
        out
    }

    /// Parses and runs one line.
    pub async fn run_line(&mut self, line: &str) -> (Flow, Vec<String>) {
        match parse(line) {
            Ok(command) => self.execute(command).await,
            Err(ParseError::Empty) => (Flow::Continue, Vec::new()),
            Err(e) => (Flow::Continue, vec![format!("error: {e}")]),
        }
    }

    /// Runs one command.
    pub async fn execute(&mut self, command: Command) -> (Flow, Vec<String>) {
        let mut out = Vec::new();
        tracing::debug!(?command, "shell: command");

        if Self::needs_task_page(&command)
            && !self.router.current().is_some_and(|route| route.is_protected())
        {
            out.push("Inicia sesión para gestionar tus tareas (login, register o google).".to_string());
            return (Flow::Continue, out);
        }

        match command {
            Command::Go(path) => self.go(&path, &mut out).await,
            Command::Register {
                email,
                password,
                name,
            } => self.register(email, password, name, &mut out).await,
            Command::Login { email, password } => self.login(email, password, &mut out).await,
            Command::Google => self.google(&mut out).await,
            Command::Logout => self.logout(&mut out).await,
            Command::List(query) => self.list(query, &mut out).await,
            Command::Filter(status) => {
                self.filter.status = status;
                self.show(&mut out);
            }
            Command::Search(term) => {
                self.filter.search = term;
                self.show(&mut out);
            }
            Command::Show => self.show(&mut out),
            Command::Get(target) => self.get(&target, &mut out).await,
            Command::Create { title, description } => {
                self.create(title, description, &mut out).await;
            }
            Command::Rename(target, title) => {
                self.edit(&target, |form| form.title = title, &mut out).await;
            }
            Command::Describe(target, text) => {
                self.edit(&target, |form| form.description = text, &mut out).await;
            }
            Command::Status(target, status) => {
                self.edit(&target, |form| form.status = Some(status), &mut out).await;
            }
            Command::Cycle(target) => self.cycle(&target, &mut out).await,
            Command::Delete(target) => self.delete(&target, &mut out).await,
            Command::Refresh => {
                // Fire and forget; the list updates when the fetch lands.
                drop(self.tasks.refresh(self.options.default_query));
                out.push("Actualizando tareas...".to_string());
            }
            Command::Stats => self.stats(&mut out),
            Command::Whoami => self.whoami(&mut out),
            Command::Help => out.extend(HELP.lines().map(str::to_string)),
            Command::Quit => return (Flow::Quit, out),
        }
        (Flow::Continue, out)
    }

    const fn needs_task_page(command: &Command) -> bool {
        matches!(
            command,
            Command::List(_)
                | Command::Filter(_)
                | Command::Search(_)
                | Command::Show
                | Command::Get(_)
                | Command::Create { .. }
                | Command::Rename(..)
                | Command::Describe(..)
                | Command::Status(..)
                | Command::Cycle(_)
                | Command::Delete(_)
                | Command::Refresh
                | Command::Stats
        )
    }

    // -----------------------------------------------------------------------
    // Navigation and session
    // -----------------------------------------------------------------------

    async fn navigate(&self, path: &str, out: &mut Vec<String>) -> Option<Navigation> {
        match self.router.navigate(path).await {
            Ok(nav) => {
                if nav.redirects.is_empty() {
                    out.push(format!("-> {}", nav.route));
                } else {
                    out.push(format!("-> {} (redirigido desde {path})", nav.route));
                }
                Some(nav)
            }
            Err(e) => {
                out.push(format!("error: {e}"));
                None
            }
        }
    }

    async fn go(&mut self, path: &str, out: &mut Vec<String>) {
        if let Some(nav) = self.navigate(path, out).await
            && nav.route == Route::TaskList
        {
            self.list(TaskQuery::default(), out).await;
        }
    }

    /// Navigates to an auth page first; a signed-in user is bounced to `/`.
    async fn enter_auth_page(&self, path: &str, out: &mut Vec<String>) -> bool {
        match self.navigate(path, out).await {
            Some(nav) if !nav.route.is_protected() => true,
            Some(_) => {
                out.push("Ya hay una sesión activa.".to_string());
                false
            }
            None => false,
        }
    }

    async fn register(&mut self, email: String, password: String, name: String, out: &mut Vec<String>) {
        if !self.enter_auth_page("/auth/register", out).await {
            return;
        }
        let form = RegisterForm {
            name,
            email,
            password,
        };
        let credentials = match form.validate() {
            Ok(credentials) => credentials,
            Err(invalid) => return self.reject_form(&invalid, out),
        };
        let name = credentials.name.clone().unwrap_or_default();
        let result = self.session.register(credentials).await;
        self.after_sign_in(
            result,
            ("¡Cuenta creada exitosamente!", format!("Bienvenido {name}, tu cuenta ha sido registrada")),
            "Error al crear cuenta",
            out,
        )
        .await;
    }

    async fn login(&mut self, email: String, password: String, out: &mut Vec<String>) {
        if !self.enter_auth_page(LOGIN_PATH, out).await {
            return;
        }
        let credentials = match (LoginForm { email, password }).validate() {
            Ok(credentials) => credentials,
            Err(invalid) => return self.reject_form(&invalid, out),
        };
        let result = self.session.login(credentials).await;
        self.after_sign_in(
            result,
            ("¡Bienvenido de vuelta!", "Has iniciado sesión correctamente".to_string()),
            "Error al iniciar sesión",
            out,
        )
        .await;
    }

    async fn google(&mut self, out: &mut Vec<String>) {
        if !self.enter_auth_page(LOGIN_PATH, out).await {
            return;
        }
        let result = self.session.login_with_federated_provider().await;
        self.after_sign_in(
            result,
            ("¡Bienvenido!", "Has iniciado sesión con Google correctamente".to_string()),
            "Error con Google",
            out,
        )
        .await;
    }

    async fn after_sign_in(
        &mut self,
        result: Result<User, SessionError>,
        success: (&str, String),
        failure_title: &str,
        out: &mut Vec<String>,
    ) {
        match &result {
            Ok(user) => {
                self.notifier.success(success.0, success.1);
                if !self.options.json {
                    out.push(format!("Sesión iniciada como {} <{}> [{}]", user.name, user.email, user.role));
                }
            }
            Err(e) => {
                self.notifier.error(failure_title, e.to_string());
                if !self.options.json {
                    out.push(format!("error: {e}"));
                }
            }
        }
        let signed_in = result.is_ok();
        if self.options.json {
            out.push(to_json(&AuthResult::from(result)));
        }
        if signed_in {
            self.go(ROOT_PATH, out).await;
        }
    }

    async fn logout(&mut self, out: &mut Vec<String>) {
        let result = self.session.logout().await;
        self.tasks.clear();
        self.listing.clear();
        if let Err(e) = &result {
            out.push(format!("error al cerrar sesión: {e}"));
        }
        if self.options.json {
            out.push(to_json(&OperationResult::from(result)));
        }
        self.navigate(LOGIN_PATH, out).await;
    }

    fn whoami(&self, out: &mut Vec<String>) {
        match self.session.current_user() {
            Some(user) => {
                if self.options.json {
                    out.push(to_json(&user));
                } else {
                    out.push(format!(
                        "{} ({}) <{}> rol={} desde {}",
                        user.name,
                        user.initials(),
                        user.email,
                        user.role,
                        user.created_at.format(&self.options.timestamp_format)
                    ));
                }
            }
            None => out.push("Sin sesión.".to_string()),
        }
        let route = self
            .router
            .current()
            .map_or_else(|| "-".to_string(), |route| route.path());
        out.push(format!("ruta actual: {route}"));
    }

    fn reject_form(&self, invalid: &ValidationFailed, out: &mut Vec<String>) {
        invalid.notify(&self.notifier);
        for error in &invalid.errors {
            out.push(format!("  {}: {}", error.field, error.message));
        }
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    fn query_with_defaults(&self, query: TaskQuery) -> TaskQuery {
        let defaults = self.options.default_query;
        TaskQuery {
            status: query.status,
            limit: query.limit.or(defaults.limit),
            sort_by: query.sort_by.or(defaults.sort_by),
            sort_order: query.sort_order.or(defaults.sort_order),
        }
    }

    async fn list(&mut self, query: TaskQuery, out: &mut Vec<String>) {
        let query = self.query_with_defaults(query);
        let result = self.tasks.list(query).await;
        if let Err(e) = &result {
            self.notifier.error("Error al cargar tareas", e.to_string());
        }
        if self.options.json {
            out.push(to_json(&OperationResult::from(result)));
            return;
        }
        match result {
            Ok(_) => self.show(out),
            Err(e) => out.push(format!("error: {e}")),
        }
    }

    fn show(&mut self, out: &mut Vec<String>) {
        let visible = self.tasks.filtered(&self.filter);
        self.listing = visible.iter().map(|task| task.id.clone()).collect();
        if self.options.json {
            out.push(to_json(&visible));
            return;
        }
        if !self.filter.is_clear() {
            out.push(format!(
                "filtro: estado={} búsqueda={:?}",
                self.filter.status, self.filter.search
            ));
        }
        if visible.is_empty() {
            out.push("No hay tareas.".to_string());
        }
        for (index, task) in visible.iter().enumerate() {
            out.push(self.format_task(index + 1, task));
        }
    }

    fn format_task(&self, position: usize, task: &Task) -> String {
        let mut line = format!(
            "{position:>3}. [{}] {}  ({}, {})",
            task.status.label(),
            task.title,
            task.id,
            task.created_at.format(&self.options.timestamp_format)
        );
        if !task.description.is_empty() {
            line.push_str("\n       ");
            line.push_str(&task.description);
        }
        line
    }

    fn resolve(&self, target: &TaskRef) -> Result<TaskId, String> {
        match target {
            TaskRef::Id(id) => Ok(id.clone()),
            TaskRef::Index(n) => n
                .checked_sub(1)
                .and_then(|i| self.listing.get(i))
                .cloned()
                .ok_or_else(|| format!("no hay tarea #{n} en la última lista")),
        }
    }

    async fn get(&mut self, target: &TaskRef, out: &mut Vec<String>) {
        let id = match self.resolve(target) {
            Ok(id) => id,
            Err(msg) => return out.push(msg),
        };
        let result = self.tasks.get(&id).await;
        if let Err(e) = &result {
            self.notifier.error("Error al cargar tarea", e.to_string());
        }
        if self.options.json {
            out.push(to_json(&OperationResult::from(result)));
            return;
        }
        match result {
            Ok(task) => {
                out.push(self.format_task(1, &task));
                out.push(format!(
                    "     actualizada {}",
                    task.updated_at.format(&self.options.timestamp_format)
                ));
            }
            Err(e) => out.push(format!("error: {e}")),
        }
    }

    async fn create(&mut self, title: String, description: String, out: &mut Vec<String>) {
        if self.navigate("/create", out).await.is_none() {
            return;
        }
        let form = TaskForm {
            title,
            description,
            ..TaskForm::default()
        };
        let new_task = match form.validate() {
            Ok(new_task) => new_task,
            Err(invalid) => return self.reject_form(&invalid, out),
        };
        let result = self.tasks.create(new_task).await;
        self.report_write(result, out);
        self.navigate(ROOT_PATH, out).await;
        if !self.options.json {
            self.show(out);
        }
    }

    /// Loads the task into the edit form, applies `change`, and saves only
    /// the fields that differ.
    async fn edit(&mut self, target: &TaskRef, change: impl FnOnce(&mut TaskForm), out: &mut Vec<String>) {
        let id = match self.resolve(target) {
            Ok(id) => id,
            Err(msg) => return out.push(msg),
        };
        if self.navigate(&format!("/edit/{id}"), out).await.is_none() {
            return;
        }
        let original = match self.tasks.get(&id).await {
            Ok(task) => task,
            Err(e) => {
                self.notifier.error("Error al cargar tarea", e.to_string());
                out.push(format!("error: {e}"));
                self.navigate(ROOT_PATH, out).await;
                return;
            }
        };
        let mut form = TaskForm::from_task(&original);
        change(&mut form);
        if !form.has_unsaved_changes(&original) {
            out.push("Sin cambios.".to_string());
            self.navigate(ROOT_PATH, out).await;
            return;
        }
        match form.changes_from(&original) {
            Ok(patch) => {
                let result = self.tasks.update(&id, patch).await;
                self.report_write(result, out);
            }
            Err(invalid) => self.reject_form(&invalid, out),
        }
        self.navigate(ROOT_PATH, out).await;
    }

    async fn cycle(&mut self, target: &TaskRef, out: &mut Vec<String>) {
        let id = match self.resolve(target) {
            Ok(id) => id,
            Err(msg) => return out.push(msg),
        };
        let result = self.tasks.cycle_status(&id).await;
        self.report_write(result, out);
    }

    async fn delete(&mut self, target: &TaskRef, out: &mut Vec<String>) {
        let id = match self.resolve(target) {
            Ok(id) => id,
            Err(msg) => return out.push(msg),
        };
        let result = self.tasks.delete(&id).await;
        if result.is_ok() {
            self.listing.retain(|listed| *listed != id);
        }
        if self.options.json {
            out.push(to_json(&OperationResult::from(result)));
        } else if let Err(e) = result {
            out.push(format!("error: {e}"));
        } else {
            out.push(format!("Eliminada {id}"));
        }
    }

    fn report_write(&self, result: Result<Task, TaskError>, out: &mut Vec<String>) {
        if self.options.json {
            out.push(to_json(&OperationResult::from(result)));
            return;
        }
        match result {
            Ok(task) => out.push(format!(
                "[{}] {} ({})",
                task.status.label(),
                task.title,
                task.id
            )),
            Err(e) => out.push(format!("error: {e}")),
        }
    }

    fn stats(&self, out: &mut Vec<String>) {
        let stats = self.tasks.stats();
        if self.options.json {
            out.push(to_json(&stats));
        } else {
            out.push(format!(
                "Total: {} | {}: {} | {}: {} | {}: {}",
                stats.total,
                TaskStatus::Pending.label(),
                stats.pending,
                TaskStatus::InProgress.label(),
                stats.in_progress,
                TaskStatus::Completed.label(),
                stats.completed
            ));
        }
    }

}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "shell: json encoding failed");
        format!("{{\"success\":false,\"error\":\"{e}\"}}")
    })
}
