use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr, Display, EnumIter)]
pub enum Route {
    #[strum(serialize = "/login")]
    Login,
    #[strum(serialize = "/register")]
    Register,
    #[strum(serialize = "/")]
    Dashboard,
    #[strum(serialize = "/workouts")]
    Workouts,
    #[strum(serialize = "/workouts/log")]
    LogWorkout,
    #[strum(serialize = "/nutrition")]
    Nutrition,
    #[strum(serialize = "/weight")]
    Weight,
    #[strum(serialize = "/goals")]
    Goals,
    #[strum(serialize = "/templates")]
    Templates,
}

impl Route {
    pub fn is_public(self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }

    pub fn path(self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Nothing is decided until the stored session has been read.
    Loading,
    Render(Route),
    Redirect(Route),
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// Where a request for `path` ends up given the session.
pub fn resolve(session: &SessionState, path: &str) -> Navigation {
    let route = normalize(path).parse::<Route>().ok();
    match (session, route) {
        (SessionState::Restoring, _) => Navigation::Loading,
        (SessionState::Unauthenticated, Some(route)) if route.is_public() => {
            Navigation::Render(route)
        }
        (SessionState::Unauthenticated, _) => Navigation::Redirect(Route::Login),
        (SessionState::Authenticated(_), Some(route)) if !route.is_public() => {
            Navigation::Render(route)
        }
        (SessionState::Authenticated(_), _) => Navigation::Redirect(Route::Dashboard),
    }
}
