//! Login-code resolution.
//!
//! One code string names both a role and a tenant: the three role tables share
//! the code namespace across every school, so resolution probes all of them and
//! applies a fixed priority order. The order (student, then teacher, then
//! principal) is a compatibility contract - nothing prevents one string from
//! existing in two tables, and priority is the only protection. The probes run
//! concurrently but are always joined before the tie-break so the outcome never
//! depends on network timing.

use serde_json::Value;

use crate::config;
use crate::directory::{ProbeTable, TenantDirectory};
use crate::error::SessionFailure;
use crate::model::{Principal, Student, Teacher, Tenant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Guardian,
    Teacher,
    Principal,
    TenantSuperuser,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Guardian => "guardian",
            Role::Teacher => "teacher",
            Role::Principal => "principal",
            Role::TenantSuperuser => "tenant_superuser",
        }
    }
}

/// Outcome of the probe phase: which role won, and where the entity lives.
/// `school_id`/`entity_id` are `None` only for the cross-tenant superuser.
#[derive(Debug, Clone)]
pub struct RoleMatch {
    pub role: Role,
    pub school_id: Option<String>,
    pub entity_id: Option<String>,
}

/// The resolved actor, holding the full record from the denormalized tenant
/// view. The sum type keeps downstream code from treating one role's data as
/// another's.
#[derive(Debug, Clone)]
pub enum ResolvedIdentity {
    Guardian(Student),
    Teacher(Teacher),
    Principal(Principal),
    Superuser,
}

impl ResolvedIdentity {
    pub fn role(&self) -> Role {
        match self {
            ResolvedIdentity::Guardian(_) => Role::Guardian,
            ResolvedIdentity::Teacher(_) => Role::Teacher,
            ResolvedIdentity::Principal(_) => Role::Principal,
            ResolvedIdentity::Superuser => Role::TenantSuperuser,
        }
    }
}

/// Resolve a presented code to a role and owning tenant.
///
/// Probes the three role tables concurrently, joins all results, then applies
/// the fixed student -> teacher -> principal priority. Multi-table collisions
/// get a diagnostic but resolve by priority unchanged. No match is
/// `InvalidCode` and the caller must fail closed.
pub async fn resolve_code<D>(directory: &D, code: &str) -> Result<RoleMatch, SessionFailure>
where
    D: TenantDirectory + ?Sized,
{
    let reserved = &config::config().session.superuser_code;
    if !reserved.is_empty() && code.eq_ignore_ascii_case(reserved) {
        return Ok(RoleMatch {
            role: Role::TenantSuperuser,
            school_id: None,
            entity_id: None,
        });
    }

    // All three probes must be joined before the tie-break; short-circuiting
    // on the first responder would make priority network-timing-dependent.
    let (students, teachers, principals) = futures::try_join!(
        directory.probe(ProbeTable::Students, code),
        directory.probe(ProbeTable::Teachers, code),
        directory.probe(ProbeTable::Principals, code),
    )?;

    let matched_tables = [
        (!students.is_empty(), ProbeTable::Students),
        (!teachers.is_empty(), ProbeTable::Teachers),
        (!principals.is_empty(), ProbeTable::Principals),
    ];
    let hit_count = matched_tables.iter().filter(|(hit, _)| *hit).count();
    if hit_count > 1 {
        let tables: Vec<_> = matched_tables
            .iter()
            .filter(|(hit, _)| *hit)
            .map(|(_, t)| t.table_name())
            .collect();
        tracing::warn!(?tables, "login code matches multiple role tables; resolving by priority");
    }

    if let Some(row) = students.first() {
        return role_match(Role::Guardian, row);
    }
    if let Some(row) = teachers.first() {
        return role_match(Role::Teacher, row);
    }
    if let Some(row) = principals.first() {
        return role_match(Role::Principal, row);
    }

    Err(SessionFailure::InvalidCode)
}

/// Locate the matched entity inside the denormalized tenant view. A miss here
/// means the data drifted between the probe and the tenant fetch.
pub fn attach(matched: &RoleMatch, tenant: Option<&Tenant>) -> Result<ResolvedIdentity, SessionFailure> {
    if matched.role == Role::TenantSuperuser {
        return Ok(ResolvedIdentity::Superuser);
    }

    let tenant = tenant.ok_or_else(|| {
        SessionFailure::InternalInconsistency("tenant view missing for a tenant-scoped role".to_string())
    })?;
    let entity_id = matched.entity_id.as_deref().ok_or_else(|| {
        SessionFailure::InternalInconsistency("probe match carried no entity id".to_string())
    })?;

    let found = match matched.role {
        Role::Guardian => tenant.student(entity_id).cloned().map(ResolvedIdentity::Guardian),
        Role::Teacher => tenant.teacher(entity_id).cloned().map(ResolvedIdentity::Teacher),
        Role::Principal => tenant.principal(entity_id).cloned().map(ResolvedIdentity::Principal),
        Role::TenantSuperuser => unreachable!(),
    };

    found.ok_or_else(|| {
        SessionFailure::InternalInconsistency(format!(
            "{} {} not present in tenant {} after denormalization",
            matched.role.as_str(),
            entity_id,
            tenant.id
        ))
    })
}

/// Probe rows are raw wire rows; pull the two fields resolution needs.
fn role_match(role: Role, row: &Value) -> Result<RoleMatch, SessionFailure> {
    let school_id = wire_id(row, "school_id").ok_or_else(|| {
        SessionFailure::InternalInconsistency(format!("{} probe row lacks school_id", role.as_str()))
    })?;
    let entity_id = wire_id(row, "id").ok_or_else(|| {
        SessionFailure::InternalInconsistency(format!("{} probe row lacks id", role.as_str()))
    })?;

    Ok(RoleMatch {
        role,
        school_id: Some(school_id),
        entity_id: Some(entity_id),
    })
}

fn wire_id(row: &Value, field: &str) -> Option<String> {
    match row.get(field) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}
