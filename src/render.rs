// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::fmt;

use crate::state::ViewState;

/// Page title.
pub const TITLE: &str = "Welcome To NFT NYC!";
/// Footer line.
pub const FOOTER: &str = "Made by NFT NYC Inc \u{2764}";

/// The single control shown for a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Ask the user to connect a wallet.
    ConnectPrompt,
    /// Offer to join the register.
    JoinButton,
    /// Join transaction is being mined.
    Loading,
    /// Connected wallet is already a member.
    Joined,
}

impl View {
    /// Text shown for this view.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ConnectPrompt => "Connect your wallet",
            Self::JoinButton => "Click here to Register!",
            Self::Loading => "Loading...",
            Self::Joined => "You are now in the register list!",
        }
    }

    /// Whether the view triggers an action when activated.
    #[must_use]
    pub fn is_actionable(self) -> bool {
        matches!(self, Self::ConnectPrompt | Self::JoinButton)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps state to the control to show. Only `connected`, `joined` and
/// `loading` are consulted.
#[must_use]
pub fn render(state: &ViewState) -> View {
    match (state.connected, state.joined, state.loading) {
        (false, _, _) => View::ConnectPrompt,
        (true, true, _) => View::Joined,
        (true, false, true) => View::Loading,
        (true, false, false) => View::JoinButton,
    }
}

/// Full textual page for a state.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    state: &'a ViewState,
}

impl<'a> Page<'a> {
    /// Page for `state`.
    #[must_use]
    pub fn new(state: &'a ViewState) -> Self {
        Self { state }
    }

    /// Control shown on this page.
    #[must_use]
    pub fn view(&self) -> View {
        render(self.state)
    }
}

impl fmt::Display for Page<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{TITLE}")?;
        writeln!(f, "You can register to join in the list!")?;
        writeln!(
            f,
            "This {} person's registered are surely going to NFT NYC!",
            self.state.count
        )?;
        match self.view() {
            view if view.is_actionable() => writeln!(f, "[ {view} ]")?,
            view => writeln!(f, "{view}")?,
        }
        write!(f, "{FOOTER}")
    }
}
