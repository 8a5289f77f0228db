//! Contacts and Thread Invitations
//!
//! A fixed directory of people and the local selection state for inviting
//! some of them to a new thread. Nothing here talks to the service.

use serde::Serialize;

/// Fewer selected contacts than this and the invitation cannot continue
pub const MIN_INVITEES: usize = 2;

/// Shown above the directory while picking
pub const INVITE_HINT: &str = "Select users to add to this thread.";

/// Someone who can be invited to a thread
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Contact {
    /// Display name
    pub name: &'static str,
    /// Email address, unique within the directory
    pub email: &'static str,
    /// Avatar image path
    pub avatar: &'static str,
}

/// The contact directory
pub static DIRECTORY: &[Contact] = &[
    Contact {
        name: "Olivia Martin",
        email: "m@example.com",
        avatar: "/avatars/01.png",
    },
    Contact {
        name: "Isabella Nguyen",
        email: "isabella.nguyen@email.com",
        avatar: "/avatars/03.png",
    },
    Contact {
        name: "Emma Wilson",
        email: "emma@example.com",
        avatar: "/avatars/05.png",
    },
    Contact {
        name: "Jackson Lee",
        email: "lee@example.com",
        avatar: "/avatars/02.png",
    },
    Contact {
        name: "William Kim",
        email: "will@email.com",
        avatar: "/avatars/04.png",
    },
];

/// Which contacts are picked for a new thread
///
/// Selection is tracked by directory position, so [`InviteSelection::selected`]
/// always lists contacts in directory order regardless of the order they
/// were toggled.
#[derive(Clone, Debug)]
pub struct InviteSelection<'a> {
    directory: &'a [Contact],
    picked: Vec<bool>,
}

impl<'a> InviteSelection<'a> {
    /// Start with nobody selected
    #[must_use]
    pub fn new(directory: &'a [Contact]) -> Self {
        Self {
            directory,
            picked: vec![false; directory.len()],
        }
    }

    /// The directory being picked from
    #[must_use]
    pub fn directory(&self) -> &'a [Contact] {
        self.directory
    }

    /// Flip the selection of the contact with `email`
    ///
    /// Returns whether the contact is now selected, or `None` if no contact
    /// has that address.
    pub fn toggle(&mut self, email: &str) -> Option<bool> {
        let position = self.position(email)?;
        self.picked[position] = !self.picked[position];
        Some(self.picked[position])
    }

    /// Whether the contact with `email` is selected
    #[must_use]
    pub fn is_selected(&self, email: &str) -> bool {
        self.position(email).is_some_and(|p| self.picked[p])
    }

    /// Selected contacts, in directory order
    #[must_use]
    pub fn selected(&self) -> Vec<&'a Contact> {
        self.directory
            .iter()
            .zip(&self.picked)
            .filter_map(|(contact, picked)| picked.then_some(contact))
            .collect()
    }

    /// Whether enough contacts are selected to continue
    #[must_use]
    pub fn can_continue(&self) -> bool {
        self.picked.iter().filter(|p| **p).count() >= MIN_INVITEES
    }

    /// Deselect everyone
    pub fn clear(&mut self) {
        self.picked.fill(false);
    }

    fn position(&self, email: &str) -> Option<usize> {
        self.directory.iter().position(|c| c.email == email)
    }
}

impl Default for InviteSelection<'static> {
    fn default() -> Self {
        Self::new(DIRECTORY)
    }
}
