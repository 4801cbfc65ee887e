//! Askama Views
//!
//! Every view carries `player_username` so the shared layout can show who
//! is signed in.

use askama::Template;

use crate::domain::entity::shop_item::ShopItem;

/// Avatars offered by the avatar shop, by prefab name in the game client
pub const AVATARS: &[&str] = &[
    "vBasicController_allie chibi",
    "Teacher2",
    "PhotonNetworkPlayer",
];

/// Home page
#[derive(Debug, Template)]
#[template(path = "index.html")]
pub struct IndexView {
    pub player_username: Option<String>,
    pub notice: Option<String>,
}

/// Registration form
#[derive(Debug, Template)]
#[template(path = "register.html")]
pub struct RegisterView {
    pub player_username: Option<String>,
}

/// Login form
#[derive(Debug, Template)]
#[template(path = "login.html")]
pub struct LoginView {
    pub player_username: Option<String>,
    pub notice: Option<String>,
}

/// Error page showing a single message
#[derive(Debug, Template)]
#[template(path = "error.html")]
pub struct ErrorView {
    pub player_username: Option<String>,
    pub message: String,
}

impl ErrorView {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            player_username: None,
            message: message.into(),
        }
    }

    pub fn with_player(mut self, player_username: Option<String>) -> Self {
        self.player_username = player_username;
        self
    }

    pub fn render_html(&self) -> askama::Result<String> {
        self.render()
    }
}

/// Shop catalog
#[derive(Debug, Template)]
#[template(path = "shop.html")]
pub struct ShopView {
    pub player_username: Option<String>,
    pub items: Vec<ShopItem>,
}

/// Avatar picker for the embedded web view
#[derive(Debug, Template)]
#[template(path = "avatarshop.html")]
pub struct AvatarShopView {
    pub player_username: Option<String>,
    pub avatars: &'static [&'static str],
}

impl AvatarShopView {
    pub fn new(player_username: Option<String>) -> Self {
        Self {
            player_username,
            avatars: AVATARS,
        }
    }
}
