use derive_more::Display;
use test_strategy::Arbitrary;

/// One of the participants of a [`Game`](`super::Game`).
#[derive(Debug, Display, Clone, Eq, PartialEq, Hash, Arbitrary)]
pub enum Player {
    /// A chat user, identified by their user id or, if invited by a plain mention, their name.
    #[display(fmt = "<@{}>", _0)]
    User(#[strategy("U[0-9A-Z]{8}")] String),

    /// The configured chess engine.
    #[display(fmt = "the engine")]
    Engine,
}

/// The chat user acting on a [`Game`](`super::Game`).
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
#[display(fmt = "{}", id)]
pub struct Caller<'a> {
    pub id: &'a str,
    pub name: &'a str,
}

impl<'a> Caller<'a> {
    pub fn new(id: &'a str, name: &'a str) -> Self {
        Caller { id, name }
    }
}

impl Player {
    /// Whether this player is the given chat user.
    ///
    /// Players invited by name match the user name case-insensitively.
    pub fn is(&self, caller: Caller<'_>) -> bool {
        match self {
            Player::User(u) => {
                u == caller.id || (!caller.name.is_empty() && u.eq_ignore_ascii_case(caller.name))
            }

            Player::Engine => false,
        }
    }

    /// A plain name for this player, without any chat markup.
    pub fn name(&self) -> &str {
        match self {
            Player::User(id) => id,
            Player::Engine => "engine",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[proptest]
    fn users_are_mentioned(#[strategy("U[0-9A-Z]{8}")] id: String) {
        assert_eq!(Player::User(id.clone()).to_string(), format!("<@{}>", id));
    }

    #[proptest]
    fn user_is_identified_by_id(
        #[strategy("U[0-9A-Z]{8}")] id: String,
        #[strategy("[a-z]{1,8}")] name: String,
    ) {
        assert!(Player::User(id.clone()).is(Caller::new(&id, &name)));
        assert!(!Player::Engine.is(Caller::new(&id, &name)));
    }

    #[proptest]
    fn user_invited_by_name_is_identified_by_name(
        #[strategy("U[0-9A-Z]{8}")] id: String,
        #[strategy("[a-z]{1,8}")] name: String,
    ) {
        assert!(Player::User(name.clone()).is(Caller::new(&id, &name)));
        assert!(Player::User(name.to_uppercase()).is(Caller::new(&id, &name)));
    }

    #[test]
    fn empty_name_matches_nobody() {
        assert!(!Player::User(String::new()).is(Caller::new("UALICE", "")));
        assert!(!Player::User("bob".into()).is(Caller::new("UALICE", "alice")));
    }

    #[proptest]
    fn name_has_no_markup(p: Player) {
        assert!(!p.name().contains('<'));
    }
}
