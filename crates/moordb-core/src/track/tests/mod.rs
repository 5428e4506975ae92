
use crate::{
    test_fixtures::{Category, Post, PostDetails},
    track::{EntryId, StateManager},
};

// Typed views over tracked fixture instances.

pub(super) fn category_view<'a>(manager: &'a StateManager, id: EntryId) -> &'a Category {
    manager
        .entity(id)
        .expect("entry must exist")
        .as_any()
        .downcast_ref::<Category>()
        .expect("entry must wrap a Category")
}

pub(super) fn post_view<'a>(manager: &'a StateManager, id: EntryId) -> &'a Post {
    manager
        .entity(id)
        .expect("entry must exist")
        .as_any()
        .downcast_ref::<Post>()
        .expect("entry must wrap a Post")
}

pub(super) fn details_view<'a>(manager: &'a StateManager, id: EntryId) -> &'a PostDetails {
    manager
        .entity(id)
        .expect("entry must exist")
        .as_any()
        .downcast_ref::<PostDetails>()
        .expect("entry must wrap a PostDetails")
}
