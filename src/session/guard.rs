use crate::models::user::Role;
use crate::session::manager::{Destination, SessionState};

/// What the shell shows for a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    AdminDashboard,
    EmployeeDashboard,
    Redirect(&'static str),
    NotFound,
}

const MAX_REDIRECTS: usize = 8;

/// True for `prefix` itself and anything below it
fn under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn dashboard(state: &SessionState, required: Role) -> View {
    match state.user() {
        None => View::Redirect(Destination::Login.path()),
        Some(user) if user.role == required => match required {
            Role::Admin => View::AdminDashboard,
            Role::Employee => View::EmployeeDashboard,
        },
        Some(_) => View::Redirect("/"),
    }
}

/// Map the session and a requested path to a view
pub fn resolve(state: &SessionState, path: &str) -> View {
    let path = path.split(['?', '#']).next().unwrap_or_default();

    if path == "/" || path.is_empty() {
        return View::Redirect(Destination::Login.path());
    }

    if path == Destination::Login.path() {
        return match state.user() {
            None => View::Login,
            Some(user) => View::Redirect(Destination::home(user.role).path()),
        };
    }

    if under(path, Destination::Admin.path()) {
        return dashboard(state, Role::Admin);
    }

    if under(path, Destination::Employee.path()) {
        return dashboard(state, Role::Employee);
    }

    View::NotFound
}

/// Resolve `path`, following redirects until a view is rendered
pub fn follow(state: &SessionState, path: &str) -> View {
    let mut view = resolve(state, path);
    for _ in 0..MAX_REDIRECTS {
        match view {
            View::Redirect(next) => view = resolve(state, next),
            rendered => return rendered,
        }
    }
    view
}
