//! Task list, creation, edit and the one-click finish / remove actions.
//!
//! Every route requires a signed-in account and only ever sees that
//! account's tasks; someone else's task id behaves like an unknown one.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use minijinja::context;
use taskmanager_core::domain::{priority_name, status_name, Priority, Status};
use taskmanager_core::entities::{SessionStore, TaskRecord, TaskStore};
use taskmanager_core::forms::TaskForm;
use taskmanager_core::FormErrors;
use tracing::{info, warn};

use crate::error::ServerError;
use crate::middleware::session::Authenticated;
use crate::routes::{found, TASKS_PATH};
use crate::schemas::{priority_choices, status_choices, TaskView};
use crate::state::AppState;

const NOT_ADDED: &str = "Error: Task has not been added. Try again";
const NOT_EDITED: &str = "Error: Task has not been edited. Try again";
const NOT_REMOVED: &str = "Error: Task has not been removed. Try again";
const NOT_FINISHED: &str = "Error: Task has not been finished. Try again";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks/", get(list_tasks))
        .route("/tasks/create/", get(create_form).post(create_task))
        .route("/edit/{task_id}", get(edit_form).post(edit_task))
        .route("/remove/{task_id}", get(remove_task).post(remove_task))
        .route("/finished/{task_id}", get(finish_task).post(finish_task))
}

async fn list_tasks(State(state): State<Arc<AppState>>, user: Authenticated) -> Result<Html<String>, ServerError> {
    let message = state.store.take_flash(&user.0.session.id).await?;
    let tasks: Vec<TaskView> = state
        .store
        .list_tasks_by_owner(user.0.account.id)
        .await?
        .iter()
        .map(TaskView::from)
        .collect();
    state.views.render(
        "tasks.html",
        context! { user_status => user.user_status(), message => message, tasks => tasks },
    )
}

async fn create_form(State(state): State<Arc<AppState>>, user: Authenticated) -> Result<Html<String>, ServerError> {
    let form = TaskForm {
        priority: priority_name(Priority::default()).to_owned(),
        status: status_name(Status::default()).to_owned(),
        ..TaskForm::default()
    };
    render_task_form(&state, &user, "create_task.html", &form, None, &FormErrors::new(), None)
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    user: Authenticated,
    Form(form): Form<TaskForm>,
) -> Result<Response, ServerError> {
    let account_id = user.0.account.id;
    match form.clean() {
        Ok(fields) => {
            let task = state.store.create_task(fields, account_id).await?;
            info!(account_id, task_id = %task.id, "task created");
            Ok(found(TASKS_PATH))
        }
        Err(errors) => {
            info!(account_id, "task not created: invalid form");
            render_task_form(&state, &user, "create_task.html", &form, None, &errors, Some(NOT_ADDED))
                .map(IntoResponse::into_response)
        }
    }
}

async fn edit_form(
    State(state): State<Arc<AppState>>,
    user: Authenticated,
    Path(task_id): Path<String>,
) -> Result<Html<String>, ServerError> {
    let task = owned_task(&state, &user, &task_id).await?;
    let form = TaskForm::from_record(&task);
    render_task_form(&state, &user, "edit.html", &form, Some(&task.id), &FormErrors::new(), None)
}

/// Invalid input leaves the stored task untouched and re-renders the form.
async fn edit_task(
    State(state): State<Arc<AppState>>,
    user: Authenticated,
    Path(task_id): Path<String>,
    Form(form): Form<TaskForm>,
) -> Result<Response, ServerError> {
    let task = owned_task(&state, &user, &task_id).await?;
    match form.clean() {
        Ok(fields) => {
            state.store.update_task(&task.id, fields).await?;
            info!(account_id = user.0.account.id, task_id = %task.id, "task updated");
            Ok(found(TASKS_PATH))
        }
        Err(errors) => {
            info!(account_id = user.0.account.id, task_id = %task.id, "task not updated: invalid form");
            render_task_form(&state, &user, "edit.html", &form, Some(&task.id), &errors, Some(NOT_EDITED))
                .map(IntoResponse::into_response)
        }
    }
}

async fn remove_task(
    State(state): State<Arc<AppState>>,
    user: Authenticated,
    Path(task_id): Path<String>,
) -> Result<Response, ServerError> {
    let removed = match find_owned(&state, &user, &task_id).await? {
        Some(task) => state.store.delete_task(&task.id).await?,
        None => false,
    };
    if removed {
        info!(account_id = user.0.account.id, task_id = %task_id, "task removed");
    } else {
        warn!(account_id = user.0.account.id, task_id = %task_id, "task was not removed");
        state.store.set_flash(&user.0.session.id, NOT_REMOVED).await?;
    }
    Ok(found(TASKS_PATH))
}

/// Mark finished: status becomes finished and `finish` becomes now.
async fn finish_task(
    State(state): State<Arc<AppState>>,
    user: Authenticated,
    Path(task_id): Path<String>,
) -> Result<Response, ServerError> {
    let finished = match find_owned(&state, &user, &task_id).await? {
        Some(task) => state.store.mark_finished(&task.id).await?,
        None => false,
    };
    if finished {
        info!(account_id = user.0.account.id, task_id = %task_id, "task finished");
    } else {
        warn!(account_id = user.0.account.id, task_id = %task_id, "task was not finished");
        state.store.set_flash(&user.0.session.id, NOT_FINISHED).await?;
    }
    Ok(found(TASKS_PATH))
}

async fn find_owned(state: &AppState, user: &Authenticated, task_id: &str) -> Result<Option<TaskRecord>, ServerError> {
    let task = state.store.get_task(task_id).await?;
    Ok(task.filter(|t| t.owner_id == user.0.account.id))
}

async fn owned_task(state: &AppState, user: &Authenticated, task_id: &str) -> Result<TaskRecord, ServerError> {
    find_owned(state, user, task_id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("task {task_id}")))
}

fn render_task_form(
    state: &AppState,
    user: &Authenticated,
    template: &str,
    form: &TaskForm,
    task_id: Option<&str>,
    errors: &FormErrors,
    message: Option<&str>,
) -> Result<Html<String>, ServerError> {
    state.views.render(
        template,
        context! {
            user_status => user.user_status(),
            message => message,
            form => form,
            errors => errors,
            task_id => task_id,
            priorities => priority_choices(),
            statuses => status_choices(),
        },
    )
}
