//! Authorization and request normalization shared by every resource handler.
//!
//! Each check is a pure function of its inputs: nothing is cached between
//! calls, so the guard can be used from any number of request tasks at once.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::middleware::AuthUser;
use crate::query::{FilterValue, OrderByQuery, QueryError, QueryParameters};

pub const ADMINISTRATOR_ROLE: &str = "administrator";

pub const READ_BILLING_ACCOUNT_SCOPE: &str = "read:project-billing-account-details";
pub const WRITE_BILLING_ACCOUNT_SCOPE: &str = "write:projects-billing-accounts";

pub const START_DATE: &str = "startDate";
pub const END_DATE: &str = "endDate";

/// Wire format of date filters, e.g. `2017-06-01T00:00Z`.
pub const DATE_FILTER_FORMAT: &str = "%Y-%m-%dT%H:%MZ";

const ALLOWED_METHODS: [&str; 3] = ["put", "post", "patch"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("Only administrators can access this resource.")]
    Forbidden,

    #[error("method should be either POST , PUT, PATCH")]
    InvalidMethod,
}

impl GuardError {
    pub fn status_code(&self) -> u16 {
        match self {
            GuardError::Forbidden => 403,
            GuardError::InvalidMethod => 400,
        }
    }
}

pub struct RequestGuard;

impl RequestGuard {
    /// Allow administrators, or machine callers holding any of `required_scopes`.
    pub fn require_admin(caller: &AuthUser, required_scopes: Option<&[&str]>) -> Result<(), GuardError> {
        if caller.has_role(ADMINISTRATOR_ROLE) {
            tracing::debug!("Granted {} via {} role", caller.user_id, ADMINISTRATOR_ROLE);
            return Ok(());
        }

        if caller.is_machine() {
            let granted = caller.scope().unwrap_or_default();
            let matched = required_scopes
                .unwrap_or_default()
                .iter()
                .find(|required| granted.iter().any(|g| g == *required));

            if let Some(scope) = matched {
                tracing::debug!("Granted machine caller {} via scope {}", caller.user_id, scope);
                return Ok(());
            }
        }

        tracing::warn!(
            "Denied {} (machine: {}, required scopes: {:?})",
            caller.user_id,
            caller.is_machine(),
            required_scopes
        );
        Err(GuardError::Forbidden)
    }

    /// Attach the parsed sort and rewrite `startDate`/`endDate` to epoch seconds.
    ///
    /// Every value is parsed before anything is written, so `params` is left
    /// untouched on error. A date field that already holds an integer is
    /// rejected rather than passed through.
    pub fn normalize_parameters(params: &mut QueryParameters, sort_raw: Option<&str>) -> Result<(), QueryError> {
        let order_by = sort_raw.map(OrderByQuery::from_raw).transpose()?;
        let start = Self::normalize_date(params, START_DATE)?;
        let end = Self::normalize_date(params, END_DATE)?;

        if let Some(order_by) = order_by {
            params.order_by = Some(order_by);
        }
        if let Some(secs) = start {
            params.filter.put(START_DATE, secs);
        }
        if let Some(secs) = end {
            params.filter.put(END_DATE, secs);
        }
        Ok(())
    }

    /// `None` imposes no constraint.
    pub fn check_method(method: Option<&str>) -> Result<(), GuardError> {
        match method {
            None => Ok(()),
            Some(m) if ALLOWED_METHODS.iter().any(|a| a.eq_ignore_ascii_case(m)) => Ok(()),
            Some(m) => {
                tracing::warn!("Rejected method override '{}'", m);
                Err(GuardError::InvalidMethod)
            }
        }
    }

    fn normalize_date(params: &QueryParameters, field: &str) -> Result<Option<i64>, QueryError> {
        match params.filter.get(field) {
            None => Ok(None),
            Some(FilterValue::Text(value)) => parse_filter_date(field, value).map(Some),
            Some(FilterValue::Integer(_)) => Err(QueryError::DateAlreadyNormalized(field.to_string())),
        }
    }
}

/// Parse a `yyyy-MM-ddTHH:mmZ` UTC timestamp into Unix epoch seconds.
pub fn parse_filter_date(field: &str, value: &str) -> Result<i64, QueryError> {
    NaiveDateTime::parse_from_str(value, DATE_FILTER_FORMAT)
        .map(|dt| dt.and_utc().timestamp())
        .map_err(|_| QueryError::InvalidDate {
            field: field.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Filter;

    fn caller(roles: &[&str], machine: bool, scopes: Option<&[&str]>) -> AuthUser {
        AuthUser {
            user_id: "caller".to_string(),
            handle: None,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            machine,
            scopes: scopes.map(|s| s.iter().map(|x| x.to_string()).collect()),
        }
    }

    fn params(pairs: &[(&str, FilterValue)]) -> QueryParameters {
        let mut filter = Filter::new();
        for (k, v) in pairs {
            filter.put(*k, v.clone());
        }
        QueryParameters::new(filter)
    }

    #[test]
    fn test_administrator_always_granted() {
        let admin = caller(&["Topcoder User", "administrator"], false, None);
        assert_eq!(RequestGuard::require_admin(&admin, None), Ok(()));
        assert_eq!(RequestGuard::require_admin(&admin, Some(&[])), Ok(()));
        assert_eq!(RequestGuard::require_admin(&admin, Some(&[WRITE_BILLING_ACCOUNT_SCOPE])), Ok(()));
    }

    #[test]
    fn test_machine_granted_on_scope_intersection() {
        let svc = caller(&[], true, Some(&["read:other", READ_BILLING_ACCOUNT_SCOPE]));
        let required = [WRITE_BILLING_ACCOUNT_SCOPE, READ_BILLING_ACCOUNT_SCOPE];
        assert_eq!(RequestGuard::require_admin(&svc, Some(&required)), Ok(()));
    }

    #[test]
    fn test_machine_denied_without_matching_scope() {
        let svc = caller(&[], true, Some(&[READ_BILLING_ACCOUNT_SCOPE]));
        assert_eq!(
            RequestGuard::require_admin(&svc, Some(&[WRITE_BILLING_ACCOUNT_SCOPE])),
            Err(GuardError::Forbidden)
        );
        assert_eq!(RequestGuard::require_admin(&svc, Some(&[])), Err(GuardError::Forbidden));
        assert_eq!(RequestGuard::require_admin(&svc, None), Err(GuardError::Forbidden));
    }

    #[test]
    fn test_machine_without_scopes_denied() {
        let svc = caller(&[], true, None);
        assert_eq!(
            RequestGuard::require_admin(&svc, Some(&[READ_BILLING_ACCOUNT_SCOPE])),
            Err(GuardError::Forbidden)
        );
    }

    #[test]
    fn test_scope_match_is_case_sensitive() {
        let svc = caller(&[], true, Some(&["READ:PROJECT-BILLING-ACCOUNT-DETAILS"]));
        assert!(RequestGuard::require_admin(&svc, Some(&[READ_BILLING_ACCOUNT_SCOPE])).is_err());
    }

    #[test]
    fn test_human_non_admin_denied_even_with_scopes() {
        let user = caller(&["Topcoder User"], false, Some(&[READ_BILLING_ACCOUNT_SCOPE]));
        let err = RequestGuard::require_admin(&user, Some(&[READ_BILLING_ACCOUNT_SCOPE])).unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.to_string(), "Only administrators can access this resource.");
    }

    #[test]
    fn test_normalize_start_date() {
        let mut p = params(&[(START_DATE, "2017-06-01T00:00Z".into())]);
        RequestGuard::normalize_parameters(&mut p, None).unwrap();
        assert_eq!(p.filter.get(START_DATE), Some(&FilterValue::Integer(1496275200)));
        assert!(p.order_by.is_none());
    }

    #[test]
    fn test_normalize_end_date_and_sort() {
        let mut p = params(&[(END_DATE, "2017-06-01T12:30Z".into()), ("name", "Acme".into())]);
        RequestGuard::normalize_parameters(&mut p, Some("name,-createdAt")).unwrap();
        assert_eq!(p.filter.get(END_DATE), Some(&FilterValue::Integer(1496275200 + 12 * 3600 + 30 * 60)));
        assert_eq!(p.filter.get("name"), Some(&FilterValue::Text("Acme".into())));
        assert_eq!(p.order_by.as_ref().map(|o| o.items.len()), Some(2));
    }

    #[test]
    fn test_non_date_fields_untouched() {
        let mut p = params(&[("name", "Acme".into())]);
        let before = p.clone();
        RequestGuard::normalize_parameters(&mut p, None).unwrap();
        assert_eq!(p, before);
    }

    #[test]
    fn test_unparseable_dates_rejected() {
        for bad in ["not-a-date", "2017-06-01T00:00:00Z", "2017-06-01T00:00+01:00", "2017-06-01T00:00", "2017-06-01"] {
            let mut p = params(&[(START_DATE, bad.into())]);
            assert!(
                matches!(RequestGuard::normalize_parameters(&mut p, None), Err(QueryError::InvalidDate { .. })),
                "accepted {}",
                bad
            );
        }
    }

    #[test]
    fn test_failure_leaves_params_unchanged() {
        let mut p = params(&[(START_DATE, "2017-06-01T00:00Z".into()), (END_DATE, "garbage".into())]);
        let before = p.clone();
        assert!(RequestGuard::normalize_parameters(&mut p, Some("name")).is_err());
        assert_eq!(p, before);
    }

    #[test]
    fn test_renormalizing_is_an_error() {
        let mut p = params(&[(START_DATE, "2017-06-01T00:00Z".into())]);
        RequestGuard::normalize_parameters(&mut p, None).unwrap();
        assert_eq!(
            RequestGuard::normalize_parameters(&mut p, None),
            Err(QueryError::DateAlreadyNormalized(START_DATE.to_string()))
        );
    }

    #[test]
    fn test_check_method() {
        assert_eq!(RequestGuard::check_method(None), Ok(()));
        for ok in ["POST", "put", "PATCH", "Post"] {
            assert_eq!(RequestGuard::check_method(Some(ok)), Ok(()));
        }
        let err = RequestGuard::check_method(Some("delete")).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "method should be either POST , PUT, PATCH");
        assert!(RequestGuard::check_method(Some("")).is_err());
    }
}
