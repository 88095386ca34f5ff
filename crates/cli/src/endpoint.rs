// crates/cli/src/endpoint.rs

//! `[user@]host:path` argument parsing.

/// One side of a run as given on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Endpoint {
    pub(crate) user: Option<String>,
    pub(crate) host: Option<String>,
    pub(crate) path: String,
}

impl Endpoint {
    pub(crate) fn parse(text: &str) -> Self {
        if let Some((head, rest)) = text.split_once(':') {
            // A single letter before the colon is a Windows drive, not
            // a host.
            if !head.is_empty() && !looks_like_drive(head) {
                let (user, host) = match head.rsplit_once('@') {
                    Some((user, host)) => (Some(user.to_string()), host.to_string()),
                    None => (None, head.to_string()),
                };
                return Self {
                    user,
                    host: Some(host),
                    path: rest.to_string(),
                };
            }
        }
        Self {
            user: None,
            host: None,
            path: text.to_string(),
        }
    }

    pub(crate) fn is_remote(&self) -> bool {
        self.host.is_some()
    }

    /// Whether the path points at a Unix-like system. Local sides answer
    /// from the build target; remote sides are judged by path shape.
    pub(crate) fn is_unix(&self) -> bool {
        if !self.is_remote() {
            return cfg!(unix);
        }
        let drive_prefixed = self.path.len() >= 2
            && self.path.as_bytes()[1] == b':'
            && self.path.as_bytes()[0].is_ascii_alphabetic();
        !drive_prefixed && !self.path.contains('\\')
    }
}

fn looks_like_drive(head: &str) -> bool {
    head.len() == 1 && head.as_bytes()[0].is_ascii_alphabetic()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_local() {
        let ep = Endpoint::parse("/srv/data");
        assert!(!ep.is_remote());
        assert_eq!(ep.path, "/srv/data");
    }

    #[test]
    fn host_and_user_are_split_off() {
        let ep = Endpoint::parse("carol@nas:/volume1/backup");
        assert_eq!(ep.user.as_deref(), Some("carol"));
        assert_eq!(ep.host.as_deref(), Some("nas"));
        assert_eq!(ep.path, "/volume1/backup");

        let ep = Endpoint::parse("nas:/volume1/backup");
        assert_eq!(ep.user, None);
        assert_eq!(ep.host.as_deref(), Some("nas"));
    }

    #[test]
    fn windows_drives_are_not_hosts() {
        let ep = Endpoint::parse(r"C:\Users\carol\data");
        assert!(!ep.is_remote());
        assert_eq!(ep.path, r"C:\Users\carol\data");
    }

    #[test]
    fn remote_platform_follows_path_shape() {
        assert!(Endpoint::parse("nas:/volume1").is_unix());
        assert!(!Endpoint::parse("pc:C:/Users/carol").is_unix());
        assert!(!Endpoint::parse(r"pc:data\files").is_unix());
    }
}
