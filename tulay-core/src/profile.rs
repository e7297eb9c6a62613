//! Static per-partner dispatch profiles.
//!
//! Each integrated government or financial system has its own header-naming
//! convention, path versioning, and content negotiation. Profiles are
//! selected by longest matching system-code prefix, with a generic fallback
//! for codes no entry claims, so a registry row like `PHILSYS_PROD` picks up
//! the `PHILSYS` conventions without any per-environment configuration.

/// Dispatch conventions for one partner family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemProfile {
    /// Uppercase system-code prefix this profile claims; empty for the
    /// generic fallback.
    pub code_prefix: &'static str,
    /// Path segment inserted between the base URL and the endpoint,
    /// e.g. `/api/v1` or `/fhir/R4`.
    pub path_prefix: &'static str,
    /// Header carrying the registered `client_id`.
    pub client_id_header: Option<&'static str>,
    /// Header carrying the registered `client_secret`.
    pub client_secret_header: Option<&'static str>,
    /// `Accept` value when the partner requires one.
    pub accept: Option<&'static str>,
    /// Fixed headers the partner expects on every call.
    pub extra_headers: &'static [(&'static str, &'static str)],
}

/// Fallback conventions for unrecognized system codes.
pub const GENERIC: SystemProfile = SystemProfile {
    code_prefix: "",
    path_prefix: "",
    client_id_header: Some("X-Client-ID"),
    client_secret_header: None,
    accept: None,
    extra_headers: &[],
};

/// Registered partner profiles. Order is irrelevant; lookup picks the
/// longest matching prefix.
static PROFILES: &[SystemProfile] = &[
    // PhilSys national identity verification.
    SystemProfile {
        code_prefix: "PHILSYS",
        path_prefix: "",
        client_id_header: Some("X-PhilSys-Client-ID"),
        client_secret_header: None,
        accept: None,
        extra_headers: &[],
    },
    // Social Security System, versioned API with a dedicated key header.
    SystemProfile {
        code_prefix: "SSS",
        path_prefix: "/api/v1",
        client_id_header: None,
        client_secret_header: Some("X-SSS-API-Key"),
        accept: None,
        extra_headers: &[],
    },
    SystemProfile {
        code_prefix: "GSIS",
        path_prefix: "",
        client_id_header: Some("X-GSIS-Client-ID"),
        client_secret_header: None,
        accept: None,
        extra_headers: &[],
    },
    SystemProfile {
        code_prefix: "PAGIBIG",
        path_prefix: "",
        client_id_header: None,
        client_secret_header: Some("X-PagIbig-API-Key"),
        accept: None,
        extra_headers: &[],
    },
    // Same agency, hyphenated registration codes.
    SystemProfile {
        code_prefix: "PAG-IBIG",
        path_prefix: "",
        client_id_header: None,
        client_secret_header: Some("X-PagIbig-API-Key"),
        accept: None,
        extra_headers: &[],
    },
    SystemProfile {
        code_prefix: "PHILHEALTH",
        path_prefix: "",
        client_id_header: Some("X-PhilHealth-Client-ID"),
        client_secret_header: None,
        accept: None,
        extra_headers: &[],
    },
    SystemProfile {
        code_prefix: "BIR",
        path_prefix: "",
        client_id_header: None,
        client_secret_header: Some("X-BIR-API-Key"),
        accept: None,
        extra_headers: &[],
    },
    SystemProfile {
        code_prefix: "BSP",
        path_prefix: "",
        client_id_header: Some("X-BSP-Client-ID"),
        client_secret_header: None,
        accept: None,
        extra_headers: &[],
    },
    // Local government units carry their unit code instead of a client id.
    SystemProfile {
        code_prefix: "LGU",
        path_prefix: "",
        client_id_header: Some("X-LGU-Code"),
        client_secret_header: None,
        accept: None,
        extra_headers: &[],
    },
    SystemProfile {
        code_prefix: "DEPED",
        path_prefix: "/api/v2",
        client_id_header: Some("X-DepEd-Client-ID"),
        client_secret_header: None,
        accept: None,
        extra_headers: &[("X-DepEd-API-Version", "2.0")],
    },
    // DOH exposes a FHIR R4 facade.
    SystemProfile {
        code_prefix: "DOH",
        path_prefix: "/fhir/R4",
        client_id_header: Some("X-DOH-Client-ID"),
        client_secret_header: None,
        accept: Some("application/fhir+json"),
        extra_headers: &[("X-FHIR-Version", "4.0.1")],
    },
    SystemProfile {
        code_prefix: "DOLE",
        path_prefix: "/api/v1",
        client_id_header: Some("X-DOLE-Client-ID"),
        client_secret_header: Some("X-DOLE-API-Key"),
        accept: None,
        extra_headers: &[],
    },
    SystemProfile {
        code_prefix: "LRA",
        path_prefix: "/api/v1",
        client_id_header: Some("X-LRA-Client-ID"),
        client_secret_header: Some("X-LRA-Registry-Code"),
        accept: None,
        extra_headers: &[],
    },
    SystemProfile {
        code_prefix: "CDA",
        path_prefix: "/api/v1",
        client_id_header: Some("X-CDA-Client-ID"),
        client_secret_header: Some("X-CDA-API-Key"),
        accept: None,
        extra_headers: &[],
    },
];

/// Resolve the dispatch profile for a system code.
///
/// Matching is case-insensitive on the code's prefix; the longest claiming
/// prefix wins and unknown codes fall back to [`GENERIC`].
#[must_use]
pub fn profile_for(system_code: &str) -> &'static SystemProfile {
    let code = system_code.trim().to_ascii_uppercase();
    PROFILES
        .iter()
        .filter(|p| code.starts_with(p.code_prefix))
        .max_by_key(|p| p.code_prefix.len())
        .unwrap_or(&GENERIC)
}
