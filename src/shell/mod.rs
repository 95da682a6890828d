//! Interactive terminal shell: screens, prompts, and wiring.
//!
//! The shell composes the gateway, store and controllers into screens
//! (landing, login, signup, password reset, dashboard) and moves between
//! them with one in-process state machine; there is no hard navigation.
//! The dashboard subscribes to session events and tears itself down on
//! `SignedOut`, dropping the subscription with the screen.

mod notify;
mod render;

pub use render::ViewMode;

use std::io::Write as _;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::auth::SessionGateway;
use crate::controller::{ControllerError, TaskForm, TaskListController};
use crate::models::SessionEvent;
use crate::store::StoreClient;

/// The screens the shell can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Landing,
    Login,
    Signup,
    ResetPassword,
    Dashboard,
    Exit,
}

/// Line-oriented prompt over stdin.
struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Read one line. `None` means stdin is closed.
    async fn line(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        print!("{}", label);
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }

    /// Read a line, defaulting to `current` when the user enters nothing.
    async fn line_or(&mut self, label: &str, current: &str) -> anyhow::Result<Option<String>> {
        let label = format!("{} [{}]: ", label, current);
        match self.line(&label).await? {
            None => Ok(None),
            Some(input) if input.trim().is_empty() => Ok(Some(current.to_string())),
            Some(input) => Ok(Some(input)),
        }
    }
}

/// The view shell.
pub struct Shell {
    gateway: Arc<SessionGateway>,
    store: StoreClient,
    view_mode: ViewMode,
}

impl Shell {
    pub fn new(gateway: Arc<SessionGateway>, store: StoreClient) -> Self {
        Self {
            gateway,
            store,
            view_mode: ViewMode::Card,
        }
    }

    /// Run the shell until the user quits or stdin closes.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut prompt = Prompt::new();
        // A live session skips the landing screen.
        let mut screen = if self.gateway.current_session().is_some() {
            Screen::Dashboard
        } else {
            Screen::Landing
        };

        loop {
            screen = match screen {
                Screen::Landing => self.landing(&mut prompt).await?,
                Screen::Login => self.login(&mut prompt).await?,
                Screen::Signup => self.signup(&mut prompt).await?,
                Screen::ResetPassword => self.reset_password(&mut prompt).await?,
                Screen::Dashboard => self.dashboard(&mut prompt).await?,
                Screen::Exit => break,
            };
        }
        Ok(())
    }

    async fn landing(&mut self, prompt: &mut Prompt) -> anyhow::Result<Screen> {
        println!("\ntaskdeck: your tasks, in the terminal");
        println!("commands: login, signup, reset, quit");
        loop {
            let Some(input) = prompt.line("> ").await? else {
                return Ok(Screen::Exit);
            };
            match input.trim() {
                "login" => return Ok(Screen::Login),
                "signup" => return Ok(Screen::Signup),
                "reset" => return Ok(Screen::ResetPassword),
                "quit" | "exit" => return Ok(Screen::Exit),
                "" => continue,
                other => println!("unknown command: {}", other),
            }
        }
    }

    async fn login(&mut self, prompt: &mut Prompt) -> anyhow::Result<Screen> {
        println!("\nLog in");
        let Some(email) = prompt.line("email: ").await? else {
            return Ok(Screen::Exit);
        };
        let Some(password) = prompt.line("password: ").await? else {
            return Ok(Screen::Exit);
        };

        match self.gateway.login(email.trim(), &password).await {
            Ok(session) => {
                notify::success("Login successful", &format!("Welcome back, {}.", session.display_name()));
                Ok(Screen::Dashboard)
            }
            Err(err) => {
                notify::error("Login failed", &err.to_string());
                Ok(Screen::Landing)
            }
        }
    }

    async fn signup(&mut self, prompt: &mut Prompt) -> anyhow::Result<Screen> {
        println!("\nCreate an account");
        let Some(name) = prompt.line("name: ").await? else {
            return Ok(Screen::Exit);
        };
        let Some(email) = prompt.line("email: ").await? else {
            return Ok(Screen::Exit);
        };
        let Some(password) = prompt.line("password: ").await? else {
            return Ok(Screen::Exit);
        };

        match self
            .gateway
            .signup(name.trim(), email.trim(), &password)
            .await
        {
            Ok(session) => {
                notify::success("Account created", &format!("Welcome, {}.", session.display_name()));
                Ok(Screen::Dashboard)
            }
            Err(err) => {
                notify::error("Signup failed", &err.to_string());
                Ok(Screen::Landing)
            }
        }
    }

    async fn reset_password(&mut self, prompt: &mut Prompt) -> anyhow::Result<Screen> {
        println!("\nPassword recovery");
        let Some(email) = prompt.line("email: ").await? else {
            return Ok(Screen::Exit);
        };
        let email = email.trim();
        if email.is_empty() {
            notify::error("Email required", "Enter your email address to recover access.");
            return Ok(Screen::Landing);
        }
        match self.gateway.reset_password_request(email).await {
            Ok(()) => notify::success(
                "Password reset email sent",
                "Check your email for the password reset link.",
            ),
            Err(err) => notify::error("Failed to send reset email", &err.to_string()),
        }
        Ok(Screen::Landing)
    }

    async fn dashboard(&mut self, prompt: &mut Prompt) -> anyhow::Result<Screen> {
        let mut controller = TaskListController::new(self.gateway.clone(), self.store.clone());
        // Held for the lifetime of this screen; dropped on return so no
        // event fires into a torn-down view.
        let mut events = self.gateway.subscribe();

        match controller.load().await {
            Ok(()) => {}
            Err(ControllerError::AuthRequired) => {
                notify::error("Sign in required", "Log in to see your tasks.");
                return Ok(Screen::Landing);
            }
            Err(err) => notify::error("Failed to load tasks", &err.to_string()),
        }

        println!(
            "\ncommands: add, edit N, toggle N, rm N, view, reload, passwd, logout, quit"
        );
        loop {
            print!("{}", render::task_list(controller.tasks(), self.view_mode));

            let input = tokio::select! {
                line = prompt.line("tasks> ") => match line? {
                    Some(input) => input,
                    None => return Ok(Screen::Exit),
                },
                event = events.recv() => {
                    if matches!(event, Some(SessionEvent::SignedOut) | None) {
                        notify::error("Signed out", "Your session ended.");
                        return Ok(Screen::Landing);
                    }
                    continue;
                }
            };

            let mut parts = input.trim().split_whitespace();
            let command = parts.next().unwrap_or("");
            let argument = parts.next();

            match command {
                "" => continue,
                "add" => self.add_task(prompt, &mut controller).await?,
                "edit" => match self.task_at(&controller, argument) {
                    Some(id) => self.edit_task(prompt, &mut controller, id).await?,
                    None => notify::error("No such task", "Use the number shown in the list."),
                },
                "toggle" => match self.task_at(&controller, argument) {
                    Some(id) => {
                        let done = controller.get(id).map(|t| t.is_done()).unwrap_or(false);
                        match controller.set_status(id, !done).await {
                            Ok(()) => notify::success(
                                if done { "Task marked as in progress" } else { "Task completed" },
                                "Task status updated successfully.",
                            ),
                            Err(err) => {
                                notify::error("Failed to update status", &err.to_string())
                            }
                        }
                    }
                    None => notify::error("No such task", "Use the number shown in the list."),
                },
                "rm" => match self.task_at(&controller, argument) {
                    Some(id) => match controller.remove(id).await {
                        Ok(()) => notify::success(
                            "Task deleted",
                            "Task has been removed successfully.",
                        ),
                        Err(err) => notify::error("Failed to delete task", &err.to_string()),
                    },
                    None => notify::error("No such task", "Use the number shown in the list."),
                },
                "view" => {
                    self.view_mode = self.view_mode.toggled();
                    println!("view mode: {}", self.view_mode.label());
                }
                "reload" => {
                    if let Err(err) = controller.load().await {
                        notify::error("Failed to load tasks", &err.to_string());
                    }
                }
                "passwd" => self.change_password(prompt).await?,
                "logout" => {
                    match self.gateway.logout().await {
                        Ok(()) => notify::success("Logged out", "See you next time."),
                        Err(err) => notify::error("Logout failed", &err.to_string()),
                    }
                    return Ok(Screen::Landing);
                }
                "quit" | "exit" => return Ok(Screen::Exit),
                "help" => println!(
                    "commands: add, edit N, toggle N, rm N, view, reload, passwd, logout, quit"
                ),
                other => println!("unknown command: {}", other),
            }
        }
    }

    /// Resolve a 1-based list index argument to a task id.
    fn task_at(&self, controller: &TaskListController, argument: Option<&str>) -> Option<uuid::Uuid> {
        let index: usize = argument?.parse().ok()?;
        controller.tasks().get(index.checked_sub(1)?).map(|t| t.id)
    }

    async fn add_task(
        &mut self,
        prompt: &mut Prompt,
        controller: &mut TaskListController,
    ) -> anyhow::Result<()> {
        let form = TaskForm::new();
        let Some(title) = prompt.line("title: ").await? else {
            return Ok(());
        };
        form.set_title(title);
        let Some(description) = prompt.line("description (optional): ").await? else {
            return Ok(());
        };
        form.set_description(description);

        match form.submit_create(&self.gateway, &self.store).await {
            Ok(task) => {
                controller.insert(task);
                notify::success("Task added", "Your new task has been created successfully.");
            }
            Err(ControllerError::Validation(reason)) => {
                notify::error("Title is required", &reason);
            }
            Err(err) => notify::error("Failed to add task", &err.to_string()),
        }
        Ok(())
    }

    async fn edit_task(
        &mut self,
        prompt: &mut Prompt,
        controller: &mut TaskListController,
        id: uuid::Uuid,
    ) -> anyhow::Result<()> {
        let Some(task) = controller.get(id).cloned() else {
            return Ok(());
        };
        let form = TaskForm::for_task(&task);

        let Some(title) = prompt.line_or("title", &form.title()).await? else {
            return Ok(());
        };
        form.set_title(title);
        let Some(description) = prompt.line_or("description", &form.description()).await? else {
            return Ok(());
        };
        form.set_description(description);
        let Some(status) = prompt
            .line_or("status (in_progress/done)", form.status().as_str())
            .await?
        else {
            return Ok(());
        };
        match crate::models::TaskStatus::from_str(status.trim()) {
            Some(status) => form.set_status(status),
            None => {
                notify::error("Invalid status", "Status must be in_progress or done.");
                return Ok(());
            }
        }

        match form.submit_edit(&self.gateway, &self.store, id).await {
            Ok(updated) => {
                controller.apply_edit(updated);
                notify::success("Task updated", "Your task has been updated successfully.");
            }
            Err(ControllerError::Validation(reason)) => {
                notify::error("Title is required", &reason);
            }
            Err(err) => notify::error("Failed to update task", &err.to_string()),
        }
        Ok(())
    }

    async fn change_password(&mut self, prompt: &mut Prompt) -> anyhow::Result<()> {
        let Some(password) = prompt.line("new password: ").await? else {
            return Ok(());
        };
        let Some(confirm) = prompt.line("confirm password: ").await? else {
            return Ok(());
        };
        if password != confirm {
            notify::error(
                "Passwords do not match",
                "Please make sure your passwords match.",
            );
            return Ok(());
        }
        match self.gateway.update_password(&password).await {
            Ok(()) => notify::success("Password updated", "Use your new password next time."),
            Err(err) => notify::error("Failed to update password", &err.to_string()),
        }
        Ok(())
    }
}
