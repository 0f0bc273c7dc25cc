/// How a YouTube channel is addressed, decided from the shape of the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelIdentity {
    /// `UC` followed by 22 characters.
    ChannelId(String),
    /// `@handle`.
    Handle(String),
    /// Legacy custom URL name.
    Custom(String),
}

impl ChannelIdentity {
    /// Channel ids win over handles; anything else is a custom name.
    #[must_use]
    pub fn parse(id: &str) -> Self {
        let id = id.trim();
        if id.starts_with("UC") && id.len() == 24 {
            ChannelIdentity::ChannelId(id.to_owned())
        } else if id.starts_with('@') {
            ChannelIdentity::Handle(id.to_owned())
        } else {
            ChannelIdentity::Custom(id.to_owned())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            ChannelIdentity::ChannelId(id)
            | ChannelIdentity::Handle(id)
            | ChannelIdentity::Custom(id) => id,
        }
    }

    /// Channel home page under `base`.
    #[must_use]
    pub fn channel_url(&self, base: &str) -> String {
        match self {
            ChannelIdentity::ChannelId(id) => format!("{base}/channel/{id}"),
            ChannelIdentity::Handle(handle) => format!("{base}/{handle}"),
            ChannelIdentity::Custom(name) => format!("{base}/c/{name}"),
        }
    }

    /// Uploads tab under `base`.
    #[must_use]
    pub fn videos_url(&self, base: &str) -> String {
        format!("{}/videos", self.channel_url(base))
    }
}
