//! Identity-provider error codes and their user-facing messages.
//!
//! The provider reports failures as code strings such as
//! `auth/wrong-password`. Known codes map to a fixed message; anything else
//! falls back to [`UNKNOWN_ERROR_MESSAGE`].

/// Message shown for any code not in the table.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Error desconocido. Intenta nuevamente.";

/// Document-store and auth codes that indicate a connectivity failure rather
/// than a rejected request.
const NETWORK_CODES: [&str; 3] = [
    "auth/network-request-failed",
    "unavailable",
    "deadline-exceeded",
];

/// Returns `true` if `code` reports a connectivity failure.
#[must_use]
pub fn is_network_code(code: &str) -> bool {
    NETWORK_CODES.contains(&code)
}

/// A classified identity-provider error code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuthCode {
    /// `auth/email-already-in-use`
    EmailAlreadyInUse,
    /// `auth/invalid-email`
    InvalidEmail,
    /// `auth/operation-not-allowed`
    OperationNotAllowed,
    /// `auth/weak-password`
    WeakPassword,
    /// `auth/user-disabled`
    UserDisabled,
    /// `auth/user-not-found`
    UserNotFound,
    /// `auth/wrong-password`
    WrongPassword,
    /// `auth/invalid-credential`
    InvalidCredential,
    /// `auth/popup-closed-by-user`
    PopupClosedByUser,
    /// `auth/cancelled-popup-request`
    CancelledPopupRequest,
    /// `auth/popup-blocked`
    PopupBlocked,
    /// `auth/account-exists-with-different-credential`
    AccountExistsWithDifferentCredential,
    /// `auth/network-request-failed`
    NetworkRequestFailed,
    /// `auth/too-many-requests`
    TooManyRequests,
    /// Any code not listed above, kept verbatim.
    Unknown(String),
}

impl AuthCode {
    /// Every known variant, in table order.
    pub const KNOWN: [Self; 14] = [
        Self::EmailAlreadyInUse,
        Self::InvalidEmail,
        Self::OperationNotAllowed,
        Self::WeakPassword,
        Self::UserDisabled,
        Self::UserNotFound,
        Self::WrongPassword,
        Self::InvalidCredential,
        Self::PopupClosedByUser,
        Self::CancelledPopupRequest,
        Self::PopupBlocked,
        Self::AccountExistsWithDifferentCredential,
        Self::NetworkRequestFailed,
        Self::TooManyRequests,
    ];

    /// Classifies a provider code string.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|known| known.code() == code)
            .unwrap_or_else(|| Self::Unknown(code.to_string()))
    }

    /// The provider code string.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::InvalidEmail => "auth/invalid-email",
            Self::OperationNotAllowed => "auth/operation-not-allowed",
            Self::WeakPassword => "auth/weak-password",
            Self::UserDisabled => "auth/user-disabled",
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::InvalidCredential => "auth/invalid-credential",
            Self::PopupClosedByUser => "auth/popup-closed-by-user",
            Self::CancelledPopupRequest => "auth/cancelled-popup-request",
            Self::PopupBlocked => "auth/popup-blocked",
            Self::AccountExistsWithDifferentCredential => {
                "auth/account-exists-with-different-credential"
            }
            Self::NetworkRequestFailed => "auth/network-request-failed",
            Self::TooManyRequests => "auth/too-many-requests",
            Self::Unknown(code) => code,
        }
    }

    /// User-facing message for this code.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmailAlreadyInUse => "Este email ya está registrado",
            Self::InvalidEmail => "Email inválido",
            Self::OperationNotAllowed => "Operación no permitida",
            Self::WeakPassword => "La contraseña debe tener al menos 6 caracteres",
            Self::UserDisabled => "Usuario deshabilitado",
            Self::UserNotFound => "Usuario no encontrado",
            Self::WrongPassword => "Contraseña incorrecta",
            Self::InvalidCredential => "Credenciales inválidas",
            Self::PopupClosedByUser => "Ventana cerrada por el usuario",
            Self::CancelledPopupRequest => "Solicitud cancelada",
            Self::PopupBlocked => "Popup bloqueado por el navegador",
            Self::AccountExistsWithDifferentCredential => "Ya existe una cuenta con este email",
            Self::NetworkRequestFailed => "Error de conexión",
            Self::TooManyRequests => "Demasiados intentos. Intenta más tarde",
            Self::Unknown(_) => UNKNOWN_ERROR_MESSAGE,
        }
    }

    /// Returns `true` for connectivity failures.
    #[must_use]
    pub fn is_network(&self) -> bool {
        is_network_code(self.code())
    }
}

impl std::fmt::Display for AuthCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}
