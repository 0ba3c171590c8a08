#[derive(Debug)]
pub enum Error {
    /// link references a node the simulation was not given: {source} -> {target}
    MissingEndpoint { source: String, target: String },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MissingEndpoint { source, target } => write!(
                f,
                "link references a node the simulation was not given: {source} -> {target}"
            ),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
