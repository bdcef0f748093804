//! Error taxonomy for requests against *arr servers.
//!
//! Every remote call reports one of these kinds. Caller-contract violations
//! (`InvalidArgument`) are kept apart from the domain `Invalid` kind, which
//! always carries the rejected value together with the accepted options.

/// Common error type for arrlink.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport failure, or a body that could not be understood.
    #[error("Connection failure: {0}")]
    ConnectionFailure(String),

    /// The server rejected the API key (HTTP 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The referenced resource does not exist (HTTP 404 or an empty lookup).
    #[error("Item not found: {0}")]
    NotFound(String),

    /// An option value is not one of the values the server accepts.
    #[error("Invalid {title}: '{value}' Options: [{}]", .options.join(", "))]
    Invalid {
        title: String,
        value: String,
        options: Vec<String>,
    },

    /// The entity already carries a server id.
    #[error("Already exists: {0}")]
    Exists(String),

    /// The entity is on the server's exclusion list.
    #[error("Excluded: {0}")]
    Excluded(String),

    /// Any other HTTP failure status.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The caller supplied no identifying argument or nothing to change.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Create a new ConnectionFailure error.
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        Self::ConnectionFailure(msg.into())
    }

    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Invalid error listing every accepted option.
    pub fn invalid<T, V, I, O>(title: T, value: V, options: I) -> Self
    where
        T: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = O>,
        O: Into<String>,
    {
        Self::Invalid {
            title: title.into(),
            value: value.into(),
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a new Exists error.
    pub fn exists<S: Into<String>>(msg: S) -> Self {
        Self::Exists(msg.into())
    }

    /// Create a new Excluded error.
    pub fn excluded<S: Into<String>>(msg: S) -> Self {
        Self::Excluded(msg.into())
    }

    /// Create a new InvalidArgument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Whether this error means the resource is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
