//! Application route table.
//!
//! `/login` is the only public view; `/` forwards to it. Every other known
//! view is guarded and belongs to exactly one role's landing area.

use tecnoquality_auth::Role;

/// Login entry point.
pub const LOGIN_PATH: &str = "/login";

pub const ROOT_PATH: &str = "/";

/// A guarded view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteSpec {
    /// Path pattern; `:name` segments match any single non-empty segment.
    pub pattern: &'static str,
    /// Landing area the view belongs to.
    pub area: Role,
}

const fn guarded(pattern: &'static str, area: Role) -> RouteSpec {
    RouteSpec { pattern, area }
}

pub const GUARDED_ROUTES: &[RouteSpec] = &[
    guarded("/Administrador", Role::Administrator),
    guarded("/ViewDriverAdministrador", Role::Administrator),
    guarded("/ViewUsersAdministrador", Role::Administrator),
    guarded("/UploadFileAdministrador", Role::Administrator),
    guarded("/InstanceUser", Role::Administrator),
    guarded("/EditUser/:id", Role::Administrator),
    guarded("/Secretary", Role::Secretary),
    guarded("/ViewBusinessSecretary", Role::Secretary),
    guarded("/InstanceBusiness", Role::Secretary),
    guarded("/EditBusiness/:id", Role::Secretary),
    guarded("/InstanceDriver", Role::Secretary),
    guarded("/AllDrivers", Role::Secretary),
    guarded("/Medic", Role::Medic),
    guarded("/MedicForm", Role::Medic),
    guarded("/ViewDriverMedic", Role::Medic),
    guarded("/Psychologist", Role::Psychologist),
    guarded("/PsychologistForm", Role::Psychologist),
    guarded("/ViewDriverPsychologist", Role::Psychologist),
    guarded("/Psicotecnica", Role::Psychotechnician),
    guarded("/UploadFilePsicotecnica", Role::Psychotechnician),
    guarded("/UploadQRPsicotecnica", Role::Psychotechnician),
    guarded("/ViewDriverPsicotecnica", Role::Psychotechnician),
    guarded("/ViewDriverQRPsicotecnica", Role::Psychotechnician),
    guarded("/Documentador", Role::Documenter),
];

/// What a path resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Login,
    /// `/`: replace-redirect to the login entry point.
    RedirectToLogin,
    Guarded(RouteSpec),
    NotFound,
}

pub fn resolve(path: &str) -> Resolution {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = match path.len() {
        0 | 1 => path,
        _ => path.trim_end_matches('/'),
    };

    match path {
        LOGIN_PATH => Resolution::Login,
        "" | ROOT_PATH => Resolution::RedirectToLogin,
        _ => GUARDED_ROUTES
            .iter()
            .find(|spec| matches_pattern(spec.pattern, path))
            .map(|spec| Resolution::Guarded(*spec))
            .unwrap_or(Resolution::NotFound),
    }
}

/// Whether `path` is the login entry point, query and trailing slash ignored.
pub fn is_login_path(path: &str) -> bool {
    matches!(resolve(path), Resolution::Login)
}

fn matches_pattern(pattern: &str, path: &str) -> bool {
    let mut pattern_segments = pattern.split('/');
    let mut path_segments = path.split('/');
    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return true,
            (Some(p), Some(s)) if p.starts_with(':') => {
                if s.is_empty() {
                    return false;
                }
            }
            (Some(p), Some(s)) if p == s => {}
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_landing_path_is_a_guarded_route_of_its_own_area() {
        for role in Role::ALL {
            match resolve(role.landing_path()) {
                Resolution::Guarded(spec) => assert_eq!(spec.area, role),
                other => panic!("landing path of {role} resolved to {other:?}"),
            }
        }
    }

    #[test]
    fn login_and_root() {
        assert_eq!(resolve("/login"), Resolution::Login);
        assert_eq!(resolve("/"), Resolution::RedirectToLogin);
        assert_eq!(resolve(""), Resolution::RedirectToLogin);
        assert_eq!(resolve("/login?next=/Medic"), Resolution::Login);
    }

    #[test]
    fn login_path_ignores_query_and_trailing_slash() {
        assert!(is_login_path("/login"));
        assert!(is_login_path("/login/"));
        assert!(is_login_path("/login?next=/MedicForm"));
        assert!(is_login_path("/login#top"));
        assert!(!is_login_path("/"));
        assert!(!is_login_path("/loginx"));
        assert!(!is_login_path("/Medic"));
    }

    #[test]
    fn parameterized_routes_need_a_value() {
        assert!(matches!(resolve("/EditUser/15"), Resolution::Guarded(spec) if spec.area == Role::Administrator));
        assert!(matches!(resolve("/EditBusiness/abc/"), Resolution::Guarded(spec) if spec.area == Role::Secretary));
        assert_eq!(resolve("/EditUser/"), Resolution::NotFound);
        assert_eq!(resolve("/EditUser"), Resolution::NotFound);
        assert_eq!(resolve("/EditUser/1/extra"), Resolution::NotFound);
    }

    #[test]
    fn unknown_paths_are_not_found() {
        assert_eq!(resolve("/medic"), Resolution::NotFound);
        assert_eq!(resolve("/Nope"), Resolution::NotFound);
    }
}
