//! Mailbox rendering shared by both container formats.

/// A sender or recipient mailbox.
///
/// Either part may be empty: Outlook items sometimes carry only a display
/// name, and bare RFC 5322 addresses carry no name.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct EmailAddress {
    /// Human-readable display name (may be empty).
    pub display_name: String,
    /// The bare email address (`user@domain`, may be empty).
    pub address: String,
}

impl EmailAddress {
    /// Build an address from optional name and address parts, trimming both.
    pub fn new(display_name: Option<&str>, address: Option<&str>) -> Self {
        Self {
            display_name: display_name.unwrap_or_default().trim().to_string(),
            address: address.unwrap_or_default().trim().to_string(),
        }
    }

    /// `true` when neither a name nor an address is known.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_empty() && self.address.is_empty()
    }

    /// Format for display: `"Display Name <address>"`, `"address"` or `"Display Name"`.
    ///
    /// A display name that merely repeats the address is dropped.
    pub fn display(&self) -> String {
        let name_is_address = self.display_name.eq_ignore_ascii_case(&self.address);
        match (self.display_name.is_empty() || name_is_address, self.address.is_empty()) {
            (true, _) => self.address.clone(),
            (false, true) => self.display_name.clone(),
            (false, false) => format!("{} <{}>", self.display_name, self.address),
        }
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// Render a list of mailboxes as one comma-separated header value.
///
/// Empty entries are dropped; `None` is returned when nothing remains, so an
/// absent header and a header with no usable mailbox look the same.
pub fn join_addresses<'a>(addrs: impl IntoIterator<Item = &'a EmailAddress>) -> Option<String> {
    let rendered: Vec<String> = addrs
        .into_iter()
        .filter(|a| !a.is_empty())
        .map(EmailAddress::display)
        .collect();
    if rendered.is_empty() {
        None
    } else {
        Some(rendered.join(", "))
    }
}
