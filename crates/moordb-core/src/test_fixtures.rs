//! Test-only fixture entities and their static models: a small blog domain
//! (category/post/post-details), generated-key types, and key-shape types
//! used across the tracking tests.

use crate::{
    model::{
        Model,
        entity::{ChangeTrackingStrategy, EntityModel},
        foreign_key::ForeignKeyModel,
        key::KeyModel,
        navigation::NavigationModel,
        property::{GenerationMode, PropertyKind, PropertyModel},
    },
    track::{EntryId, StateManager},
    traits::{EntityObject, NavigationCell},
    value::Value,
};
use std::any::Any;
use ulid::Ulid;

const fn property(
    name: &'static str,
    index: usize,
    kind: PropertyKind,
) -> PropertyModel {
    PropertyModel {
        name,
        index,
        kind,
        nullable: false,
        read_only: false,
        store_computed: false,
        generated: GenerationMode::None,
    }
}

///
/// Category — principal with a collection of posts.
///

pub(crate) const CATEGORY_ID: usize = 0;
pub(crate) const CATEGORY_NAME: usize = 1;
pub(crate) const CATEGORY_POSTS_NAV: usize = 0;

#[derive(Debug, Default)]
pub(crate) struct Category {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) posts: Vec<EntryId>,
}

pub(crate) static CATEGORY_MODEL: EntityModel = EntityModel {
    path: "fixtures::Category",
    entity_name: "Category",
    properties: &[
        property("id", CATEGORY_ID, PropertyKind::Int),
        property("name", CATEGORY_NAME, PropertyKind::Text),
    ],
    primary_key: KeyModel { properties: &[CATEGORY_ID] },
    foreign_keys: &[],
    navigations: &[NavigationModel {
        name: "posts",
        index: CATEGORY_POSTS_NAV,
        target_path: "fixtures::Post",
        foreign_key: 0,
        points_to_principal: false,
        collection: true,
        inverse: Some(POST_CATEGORY_NAV),
    }],
    change_tracking: ChangeTrackingStrategy::Snapshot,
    new_instance: category_instance,
};

fn category_instance() -> Box<dyn EntityObject> {
    Box::<Category>::default()
}

impl EntityObject for Category {
    fn model(&self) -> &'static EntityModel {
        &CATEGORY_MODEL
    }

    fn get(&self, property: usize) -> Value {
        match property {
            CATEGORY_ID => Value::Int(self.id),
            CATEGORY_NAME => Value::Text(self.name.clone()),
            _ => panic!("Category has no property {property}"),
        }
    }

    fn set(&mut self, property: usize, value: Value) {
        match (property, value) {
            (CATEGORY_ID, Value::Int(v)) => self.id = v,
            (CATEGORY_NAME, Value::Text(v)) => self.name = v,
            (property, value) => panic!("Category property {property} cannot hold {value:?}"),
        }
    }

    fn navigation(&self, navigation: usize) -> NavigationCell {
        match navigation {
            CATEGORY_POSTS_NAV => NavigationCell::Collection(self.posts.clone()),
            _ => panic!("Category has no navigation {navigation}"),
        }
    }

    fn set_navigation(&mut self, navigation: usize, cell: NavigationCell) {
        match (navigation, cell) {
            (CATEGORY_POSTS_NAV, NavigationCell::Collection(members)) => self.posts = members,
            (navigation, cell) => {
                panic!("Category navigation {navigation} cannot hold {cell:?}")
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

///
/// Post — dependent of Category, principal of PostDetails, store-generated
/// integer key.
///

pub(crate) const POST_ID: usize = 0;
pub(crate) const POST_TITLE: usize = 1;
pub(crate) const POST_CATEGORY_ID: usize = 2;
pub(crate) const POST_CATEGORY_NAV: usize = 0;
pub(crate) const POST_DETAILS_NAV: usize = 1;

#[derive(Debug, Default)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) category_id: Option<i64>,
    pub(crate) category: Option<EntryId>,
    pub(crate) details: Option<EntryId>,
}

pub(crate) static POST_MODEL: EntityModel = EntityModel {
    path: "fixtures::Post",
    entity_name: "Post",
    properties: &[
        PropertyModel {
            name: "id",
            index: POST_ID,
            kind: PropertyKind::Int,
            nullable: false,
            read_only: false,
            store_computed: false,
            generated: GenerationMode::OnAddStore,
        },
        property("title", POST_TITLE, PropertyKind::Text),
        PropertyModel {
            name: "category_id",
            index: POST_CATEGORY_ID,
            kind: PropertyKind::Int,
            nullable: true,
            read_only: false,
            store_computed: false,
            generated: GenerationMode::None,
        },
    ],
    primary_key: KeyModel { properties: &[POST_ID] },
    foreign_keys: &[ForeignKeyModel {
        name: "post_category",
        principal_path: "fixtures::Category",
        principal_key: &[CATEGORY_ID],
        properties: &[POST_CATEGORY_ID],
        unique: false,
        owned: false,
    }],
    navigations: &[
        NavigationModel {
            name: "category",
            index: POST_CATEGORY_NAV,
            target_path: "fixtures::Category",
            foreign_key: 0,
            points_to_principal: true,
            collection: false,
            inverse: Some(CATEGORY_POSTS_NAV),
        },
        NavigationModel {
            name: "details",
            index: POST_DETAILS_NAV,
            target_path: "fixtures::PostDetails",
            foreign_key: 0,
            points_to_principal: false,
            collection: false,
            inverse: Some(DETAILS_POST_NAV),
        },
    ],
    change_tracking: ChangeTrackingStrategy::Snapshot,
    new_instance: post_instance,
};

fn post_instance() -> Box<dyn EntityObject> {
    Box::<Post>::default()
}

impl EntityObject for Post {
    fn model(&self) -> &'static EntityModel {
        &POST_MODEL
    }

    fn get(&self, property: usize) -> Value {
        match property {
            POST_ID => Value::Int(self.id),
            POST_TITLE => Value::Text(self.title.clone()),
            POST_CATEGORY_ID => self.category_id.into(),
            _ => panic!("Post has no property {property}"),
        }
    }

    fn set(&mut self, property: usize, value: Value) {
        match (property, value) {
            (POST_ID, Value::Int(v)) => self.id = v,
            (POST_TITLE, Value::Text(v)) => self.title = v,
            (POST_CATEGORY_ID, Value::Int(v)) => self.category_id = Some(v),
            (POST_CATEGORY_ID, Value::Null) => self.category_id = None,
            (property, value) => panic!("Post property {property} cannot hold {value:?}"),
        }
    }

    fn navigation(&self, navigation: usize) -> NavigationCell {
        match navigation {
            POST_CATEGORY_NAV => NavigationCell::Reference(self.category),
            POST_DETAILS_NAV => NavigationCell::Reference(self.details),
            _ => panic!("Post has no navigation {navigation}"),
        }
    }

    fn set_navigation(&mut self, navigation: usize, cell: NavigationCell) {
        match (navigation, cell) {
            (POST_CATEGORY_NAV, NavigationCell::Reference(target)) => self.category = target,
            (POST_DETAILS_NAV, NavigationCell::Reference(target)) => self.details = target,
            (navigation, cell) => panic!("Post navigation {navigation} cannot hold {cell:?}"),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

///
/// PostDetails — unique (1:1) dependent of Post.
///

pub(crate) const DETAILS_ID: usize = 0;
pub(crate) const DETAILS_POST_ID: usize = 1;
pub(crate) const DETAILS_POST_NAV: usize = 0;

#[derive(Debug, Default)]
pub(crate) struct PostDetails {
    pub(crate) id: i64,
    pub(crate) post_id: Option<i64>,
    pub(crate) post: Option<EntryId>,
}

pub(crate) static POST_DETAILS_MODEL: EntityModel = EntityModel {
    path: "fixtures::PostDetails",
    entity_name: "PostDetails",
    properties: &[
        property("id", DETAILS_ID, PropertyKind::Int),
        PropertyModel {
            name: "post_id",
            index: DETAILS_POST_ID,
            kind: PropertyKind::Int,
            nullable: true,
            read_only: false,
            store_computed: false,
            generated: GenerationMode::None,
        },
    ],
    primary_key: KeyModel { properties: &[DETAILS_ID] },
    foreign_keys: &[ForeignKeyModel {
        name: "details_post",
        principal_path: "fixtures::Post",
        principal_key: &[POST_ID],
        properties: &[DETAILS_POST_ID],
        unique: true,
        owned: true,
    }],
    navigations: &[NavigationModel {
        name: "post",
        index: DETAILS_POST_NAV,
        target_path: "fixtures::Post",
        foreign_key: 0,
        points_to_principal: true,
        collection: false,
        inverse: Some(POST_DETAILS_NAV),
    }],
    change_tracking: ChangeTrackingStrategy::Snapshot,
    new_instance: details_instance,
};

fn details_instance() -> Box<dyn EntityObject> {
    Box::<PostDetails>::default()
}

impl EntityObject for PostDetails {
    fn model(&self) -> &'static EntityModel {
        &POST_DETAILS_MODEL
    }

    fn get(&self, property: usize) -> Value {
        match property {
            DETAILS_ID => Value::Int(self.id),
            DETAILS_POST_ID => self.post_id.into(),
            _ => panic!("PostDetails has no property {property}"),
        }
    }

    fn set(&mut self, property: usize, value: Value) {
        match (property, value) {
            (DETAILS_ID, Value::Int(v)) => self.id = v,
            (DETAILS_POST_ID, Value::Int(v)) => self.post_id = Some(v),
            (DETAILS_POST_ID, Value::Null) => self.post_id = None,
            (property, value) => panic!("PostDetails property {property} cannot hold {value:?}"),
        }
    }

    fn navigation(&self, navigation: usize) -> NavigationCell {
        match navigation {
            DETAILS_POST_NAV => NavigationCell::Reference(self.post),
            _ => panic!("PostDetails has no navigation {navigation}"),
        }
    }

    fn set_navigation(&mut self, navigation: usize, cell: NavigationCell) {
        match (navigation, cell) {
            (DETAILS_POST_NAV, NavigationCell::Reference(target)) => self.post = target,
            (navigation, cell) => {
                panic!("PostDetails navigation {navigation} cannot hold {cell:?}")
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

///
/// Draft — client-generated ULID key, no relationships.
///

pub(crate) const DRAFT_ID: usize = 0;
pub(crate) const DRAFT_BODY: usize = 1;

#[derive(Debug, Default)]
pub(crate) struct Draft {
    pub(crate) id: Ulid,
    pub(crate) body: String,
}

pub(crate) static DRAFT_MODEL: EntityModel = EntityModel {
    path: "fixtures::Draft",
    entity_name: "Draft",
    properties: &[
        PropertyModel {
            name: "id",
            index: DRAFT_ID,
            kind: PropertyKind::Ulid,
            nullable: false,
            read_only: false,
            store_computed: false,
            generated: GenerationMode::OnAdd,
        },
        property("body", DRAFT_BODY, PropertyKind::Text),
    ],
    primary_key: KeyModel { properties: &[DRAFT_ID] },
    foreign_keys: &[],
    navigations: &[],
    change_tracking: ChangeTrackingStrategy::Snapshot,
    new_instance: draft_instance,
};

fn draft_instance() -> Box<dyn EntityObject> {
    Box::<Draft>::default()
}

impl EntityObject for Draft {
    fn model(&self) -> &'static EntityModel {
        &DRAFT_MODEL
    }

    fn get(&self, property: usize) -> Value {
        match property {
            DRAFT_ID => Value::Ulid(self.id),
            DRAFT_BODY => Value::Text(self.body.clone()),
            _ => panic!("Draft has no property {property}"),
        }
    }

    fn set(&mut self, property: usize, value: Value) {
        match (property, value) {
            (DRAFT_ID, Value::Ulid(v)) => self.id = v,
            (DRAFT_BODY, Value::Text(v)) => self.body = v,
            (property, value) => panic!("Draft property {property} cannot hold {value:?}"),
        }
    }

    fn navigation(&self, navigation: usize) -> NavigationCell {
        panic!("Draft has no navigation {navigation}")
    }

    fn set_navigation(&mut self, navigation: usize, _cell: NavigationCell) {
        panic!("Draft has no navigation {navigation}")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

///
/// Vote — composite primary key.
///

pub(crate) const VOTE_POST_ID: usize = 0;
pub(crate) const VOTE_VOTER: usize = 1;

#[derive(Debug, Default)]
pub(crate) struct Vote {
    pub(crate) post_id: i64,
    pub(crate) voter: String,
}

pub(crate) static VOTE_MODEL: EntityModel = EntityModel {
    path: "fixtures::Vote",
    entity_name: "Vote",
    properties: &[
        property("post_id", VOTE_POST_ID, PropertyKind::Int),
        property("voter", VOTE_VOTER, PropertyKind::Text),
    ],
    primary_key: KeyModel {
        properties: &[VOTE_POST_ID, VOTE_VOTER],
    },
    foreign_keys: &[],
    navigations: &[],
    change_tracking: ChangeTrackingStrategy::Snapshot,
    new_instance: vote_instance,
};

fn vote_instance() -> Box<dyn EntityObject> {
    Box::<Vote>::default()
}

impl EntityObject for Vote {
    fn model(&self) -> &'static EntityModel {
        &VOTE_MODEL
    }

    fn get(&self, property: usize) -> Value {
        match property {
            VOTE_POST_ID => Value::Int(self.post_id),
            VOTE_VOTER => Value::Text(self.voter.clone()),
            _ => panic!("Vote has no property {property}"),
        }
    }

    fn set(&mut self, property: usize, value: Value) {
        match (property, value) {
            (VOTE_POST_ID, Value::Int(v)) => self.post_id = v,
            (VOTE_VOTER, Value::Text(v)) => self.voter = v,
            (property, value) => panic!("Vote property {property} cannot hold {value:?}"),
        }
    }

    fn navigation(&self, navigation: usize) -> NavigationCell {
        panic!("Vote has no navigation {navigation}")
    }

    fn set_navigation(&mut self, navigation: usize, _cell: NavigationCell) {
        panic!("Vote has no navigation {navigation}")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

///
/// Fingerprint — byte-sequence primary key (structural comparison).
///

pub(crate) const FINGERPRINT_DIGEST: usize = 0;
pub(crate) const FINGERPRINT_LABEL: usize = 1;

#[derive(Debug, Default)]
pub(crate) struct Fingerprint {
    pub(crate) digest: Vec<u8>,
    pub(crate) label: String,
}

pub(crate) static FINGERPRINT_MODEL: EntityModel = EntityModel {
    path: "fixtures::Fingerprint",
    entity_name: "Fingerprint",
    properties: &[
        property("digest", FINGERPRINT_DIGEST, PropertyKind::Blob),
        property("label", FINGERPRINT_LABEL, PropertyKind::Text),
    ],
    primary_key: KeyModel {
        properties: &[FINGERPRINT_DIGEST],
    },
    foreign_keys: &[],
    navigations: &[],
    change_tracking: ChangeTrackingStrategy::Snapshot,
    new_instance: fingerprint_instance,
};

fn fingerprint_instance() -> Box<dyn EntityObject> {
    Box::<Fingerprint>::default()
}

impl EntityObject for Fingerprint {
    fn model(&self) -> &'static EntityModel {
        &FINGERPRINT_MODEL
    }

    fn get(&self, property: usize) -> Value {
        match property {
            FINGERPRINT_DIGEST => Value::Blob(self.digest.clone()),
            FINGERPRINT_LABEL => Value::Text(self.label.clone()),
            _ => panic!("Fingerprint has no property {property}"),
        }
    }

    fn set(&mut self, property: usize, value: Value) {
        match (property, value) {
            (FINGERPRINT_DIGEST, Value::Blob(v)) => self.digest = v,
            (FINGERPRINT_LABEL, Value::Text(v)) => self.label = v,
            (property, value) => panic!("Fingerprint property {property} cannot hold {value:?}"),
        }
    }

    fn navigation(&self, navigation: usize) -> NavigationCell {
        panic!("Fingerprint has no navigation {navigation}")
    }

    fn set_navigation(&mut self, navigation: usize, _cell: NavigationCell) {
        panic!("Fingerprint has no navigation {navigation}")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

///
/// Beacon — push-based change tracking; the batch sweep skips it.
///

pub(crate) const BEACON_ID: usize = 0;
pub(crate) const BEACON_LEVEL: usize = 1;

#[derive(Debug, Default)]
pub(crate) struct Beacon {
    pub(crate) id: i64,
    pub(crate) level: i64,
}

pub(crate) static BEACON_MODEL: EntityModel = EntityModel {
    path: "fixtures::Beacon",
    entity_name: "Beacon",
    properties: &[
        property("id", BEACON_ID, PropertyKind::Int),
        property("level", BEACON_LEVEL, PropertyKind::Int),
    ],
    primary_key: KeyModel { properties: &[BEACON_ID] },
    foreign_keys: &[],
    navigations: &[],
    change_tracking: ChangeTrackingStrategy::Notifications,
    new_instance: beacon_instance,
};

fn beacon_instance() -> Box<dyn EntityObject> {
    Box::<Beacon>::default()
}

impl EntityObject for Beacon {
    fn model(&self) -> &'static EntityModel {
        &BEACON_MODEL
    }

    fn get(&self, property: usize) -> Value {
        match property {
            BEACON_ID => Value::Int(self.id),
            BEACON_LEVEL => Value::Int(self.level),
            _ => panic!("Beacon has no property {property}"),
        }
    }

    fn set(&mut self, property: usize, value: Value) {
        match (property, value) {
            (BEACON_ID, Value::Int(v)) => self.id = v,
            (BEACON_LEVEL, Value::Int(v)) => self.level = v,
            (property, value) => panic!("Beacon property {property} cannot hold {value:?}"),
        }
    }

    fn navigation(&self, navigation: usize) -> NavigationCell {
        panic!("Beacon has no navigation {navigation}")
    }

    fn set_navigation(&mut self, navigation: usize, _cell: NavigationCell) {
        panic!("Beacon has no navigation {navigation}")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

///
/// Ledger — read-only and store-computed property shapes.
///

pub(crate) const LEDGER_ID: usize = 0;
pub(crate) const LEDGER_CODE: usize = 1;
pub(crate) const LEDGER_TOTAL: usize = 2;

#[derive(Debug, Default)]
pub(crate) struct Ledger {
    pub(crate) id: i64,
    pub(crate) code: String,
    pub(crate) total: i64,
}

pub(crate) static LEDGER_MODEL: EntityModel = EntityModel {
    path: "fixtures::Ledger",
    entity_name: "Ledger",
    properties: &[
        property("id", LEDGER_ID, PropertyKind::Int),
        PropertyModel {
            name: "code",
            index: LEDGER_CODE,
            kind: PropertyKind::Text,
            nullable: false,
            read_only: true,
            store_computed: false,
            generated: GenerationMode::None,
        },
        PropertyModel {
            name: "total",
            index: LEDGER_TOTAL,
            kind: PropertyKind::Int,
            nullable: false,
            read_only: false,
            store_computed: true,
            generated: GenerationMode::None,
        },
    ],
    primary_key: KeyModel { properties: &[LEDGER_ID] },
    foreign_keys: &[],
    navigations: &[],
    change_tracking: ChangeTrackingStrategy::Snapshot,
    new_instance: ledger_instance,
};

fn ledger_instance() -> Box<dyn EntityObject> {
    Box::<Ledger>::default()
}

impl EntityObject for Ledger {
    fn model(&self) -> &'static EntityModel {
        &LEDGER_MODEL
    }

    fn get(&self, property: usize) -> Value {
        match property {
            LEDGER_ID => Value::Int(self.id),
            LEDGER_CODE => Value::Text(self.code.clone()),
            LEDGER_TOTAL => Value::Int(self.total),
            _ => panic!("Ledger has no property {property}"),
        }
    }

    fn set(&mut self, property: usize, value: Value) {
        match (property, value) {
            (LEDGER_ID, Value::Int(v)) => self.id = v,
            (LEDGER_CODE, Value::Text(v)) => self.code = v,
            (LEDGER_TOTAL, Value::Int(v)) => self.total = v,
            (property, value) => panic!("Ledger property {property} cannot hold {value:?}"),
        }
    }

    fn navigation(&self, navigation: usize) -> NavigationCell {
        panic!("Ledger has no navigation {navigation}")
    }

    fn set_navigation(&mut self, navigation: usize, _cell: NavigationCell) {
        panic!("Ledger has no navigation {navigation}")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

///
/// Relay — self-referential chain (next/prev over the same type), used for
/// cyclic-graph and key-cascade shapes.
///

pub(crate) const RELAY_ID: usize = 0;
pub(crate) const RELAY_NEXT_ID: usize = 1;
pub(crate) const RELAY_NEXT_NAV: usize = 0;
pub(crate) const RELAY_PREV_NAV: usize = 1;

#[derive(Debug, Default)]
pub(crate) struct Relay {
    pub(crate) id: i64,
    pub(crate) next_id: Option<i64>,
    pub(crate) next: Option<EntryId>,
    pub(crate) prev: Vec<EntryId>,
}

pub(crate) static RELAY_MODEL: EntityModel = EntityModel {
    path: "fixtures::Relay",
    entity_name: "Relay",
    properties: &[
        property("id", RELAY_ID, PropertyKind::Int),
        PropertyModel {
            name: "next_id",
            index: RELAY_NEXT_ID,
            kind: PropertyKind::Int,
            nullable: true,
            read_only: false,
            store_computed: false,
            generated: GenerationMode::None,
        },
    ],
    primary_key: KeyModel { properties: &[RELAY_ID] },
    foreign_keys: &[ForeignKeyModel {
        name: "relay_next",
        principal_path: "fixtures::Relay",
        principal_key: &[RELAY_ID],
        properties: &[RELAY_NEXT_ID],
        unique: false,
        owned: false,
    }],
    navigations: &[
        NavigationModel {
            name: "next",
            index: RELAY_NEXT_NAV,
            target_path: "fixtures::Relay",
            foreign_key: 0,
            points_to_principal: true,
            collection: false,
            inverse: Some(RELAY_PREV_NAV),
        },
        NavigationModel {
            name: "prev",
            index: RELAY_PREV_NAV,
            target_path: "fixtures::Relay",
            foreign_key: 0,
            points_to_principal: false,
            collection: true,
            inverse: Some(RELAY_NEXT_NAV),
        },
    ],
    change_tracking: ChangeTrackingStrategy::Snapshot,
    new_instance: relay_instance,
};

fn relay_instance() -> Box<dyn EntityObject> {
    Box::<Relay>::default()
}

impl EntityObject for Relay {
    fn model(&self) -> &'static EntityModel {
        &RELAY_MODEL
    }

    fn get(&self, property: usize) -> Value {
        match property {
            RELAY_ID => Value::Int(self.id),
            RELAY_NEXT_ID => self.next_id.into(),
            _ => panic!("Relay has no property {property}"),
        }
    }

    fn set(&mut self, property: usize, value: Value) {
        match (property, value) {
            (RELAY_ID, Value::Int(v)) => self.id = v,
            (RELAY_NEXT_ID, Value::Int(v)) => self.next_id = Some(v),
            (RELAY_NEXT_ID, Value::Null) => self.next_id = None,
            (property, value) => panic!("Relay property {property} cannot hold {value:?}"),
        }
    }

    fn navigation(&self, navigation: usize) -> NavigationCell {
        match navigation {
            RELAY_NEXT_NAV => NavigationCell::Reference(self.next),
            RELAY_PREV_NAV => NavigationCell::Collection(self.prev.clone()),
            _ => panic!("Relay has no navigation {navigation}"),
        }
    }

    fn set_navigation(&mut self, navigation: usize, cell: NavigationCell) {
        match (navigation, cell) {
            (RELAY_NEXT_NAV, NavigationCell::Reference(target)) => self.next = target,
            (RELAY_PREV_NAV, NavigationCell::Collection(members)) => self.prev = members,
            (navigation, cell) => panic!("Relay navigation {navigation} cannot hold {cell:?}"),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

///
/// Fixture registry and builders
///

pub(crate) static FIXTURE_MODEL: Model = Model {
    entities: &[
        &CATEGORY_MODEL,
        &POST_MODEL,
        &POST_DETAILS_MODEL,
        &DRAFT_MODEL,
        &VOTE_MODEL,
        &FINGERPRINT_MODEL,
        &BEACON_MODEL,
        &LEDGER_MODEL,
        &RELAY_MODEL,
    ],
};

pub(crate) fn manager() -> StateManager {
    StateManager::new(FIXTURE_MODEL)
}

pub(crate) fn category(id: i64, name: &str) -> Box<dyn EntityObject> {
    Box::new(Category {
        id,
        name: name.to_string(),
        posts: Vec::new(),
    })
}

pub(crate) fn post(id: i64, title: &str, category_id: Option<i64>) -> Box<dyn EntityObject> {
    Box::new(Post {
        id,
        title: title.to_string(),
        category_id,
        category: None,
        details: None,
    })
}

pub(crate) fn details(id: i64, post_id: Option<i64>) -> Box<dyn EntityObject> {
    Box::new(PostDetails {
        id,
        post_id,
        post: None,
    })
}

pub(crate) fn draft(body: &str) -> Box<dyn EntityObject> {
    Box::new(Draft {
        id: Ulid::nil(),
        body: body.to_string(),
    })
}

pub(crate) fn ledger(id: i64, code: &str) -> Box<dyn EntityObject> {
    Box::new(Ledger {
        id,
        code: code.to_string(),
        total: 0,
    })
}

pub(crate) fn relay(id: i64, next_id: Option<i64>) -> Box<dyn EntityObject> {
    Box::new(Relay {
        id,
        next_id,
        next: None,
        prev: Vec::new(),
    })
}
