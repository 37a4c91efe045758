//! The closed set of privileges known to the application.

use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A named, indivisible permission that may be granted to a role.
///
/// A privilege has two spellings: the `value` used in configuration files and
/// on the wire (`listComments`), and the `identifier` it is declared under
/// (`LIST_COMMENTS`). The identifier is the display spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "&'static str")]
pub struct Privilege {
    identifier: &'static str,
    value: &'static str,
}

impl Privilege {
    /// Declare a privilege outside of the built-in table.
    ///
    /// Nothing checks the pair here; run it through
    /// [`PrivilegeRegistry::validate_all_naming`](crate::PrivilegeRegistry::validate_all_naming).
    pub const fn new(identifier: &'static str, value: &'static str) -> Self {
        Self { identifier, value }
    }

    pub fn identifier(&self) -> &'static str {
        self.identifier
    }

    pub fn value(&self) -> &'static str {
        self.value
    }

    /// Look up a built-in privilege by its value.
    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.value == value)
    }
}

/// Generates one associated constant per privilege plus the `ALL` slice, so the
/// two can never disagree. The identifier is taken from the constant name.
macro_rules! declare_privileges {
    ($( $name:ident = $value:literal; )*) => {
        impl Privilege {
            $(
                pub const $name: Privilege = Privilege::new(stringify!($name), $value);
            )*

            /// Every built-in privilege, in declaration order.
            pub const ALL: &'static [Privilege] = &[$(Privilege::$name),*];
        }
    };
}

declare_privileges! {
    // posts
    LIST_POSTS = "listPosts";
    LIST_SAFE_POSTS = "listSafePosts";
    LIST_SKETCHY_POSTS = "listSketchyPosts";
    LIST_UNSAFE_POSTS = "listUnsafePosts";
    VIEW_POSTS = "viewPosts";
    UPLOAD_POSTS = "uploadPosts";
    UPLOAD_POSTS_ANONYMOUSLY = "uploadPostsAnonymously";
    DELETE_POSTS = "deletePosts";
    FEATURE_POSTS = "featurePosts";
    CHANGE_POST_SAFETY = "changePostSafety";
    CHANGE_POST_SOURCE = "changePostSource";
    CHANGE_POST_TAGS = "changePostTags";
    CHANGE_POST_CONTENT = "changePostContent";
    CHANGE_POST_THUMBNAIL = "changePostThumbnail";
    CHANGE_POST_RELATIONS = "changePostRelations";
    CHANGE_POST_FLAGS = "changePostFlags";
    ADD_POST_NOTES = "addPostNotes";
    EDIT_POST_NOTES = "editPostNotes";
    DELETE_POST_NOTES = "deletePostNotes";
    SCORE_POSTS = "scorePosts";
    FAVORITE_POSTS = "favoritePosts";

    // tags
    LIST_TAGS = "listTags";
    MASS_TAG = "massTag";
    CHANGE_TAG_NAME = "changeTagName";
    CHANGE_TAG_CATEGORY = "changeTagCategory";
    CHANGE_TAG_IMPLICATIONS = "changeTagImplications";
    CHANGE_TAG_SUGGESTIONS = "changeTagSuggestions";
    DELETE_TAGS = "deleteTags";
    MERGE_TAGS = "mergeTags";

    // users
    LIST_USERS = "listUsers";
    VIEW_USERS = "viewUsers";
    REGISTER = "register";
    CHANGE_OWN_NAME = "changeOwnName";
    CHANGE_ALL_NAMES = "changeAllNames";
    CHANGE_OWN_EMAIL_ADDRESS = "changeOwnEmailAddress";
    CHANGE_ALL_EMAIL_ADDRESSES = "changeAllEmailAddresses";
    CHANGE_OWN_PASSWORD = "changeOwnPassword";
    CHANGE_ALL_PASSWORDS = "changeAllPasswords";
    CHANGE_OWN_AVATAR_STYLE = "changeOwnAvatarStyle";
    CHANGE_ALL_AVATAR_STYLES = "changeAllAvatarStyles";
    CHANGE_ACCESS_RANK = "changeAccessRank";
    DELETE_OWN_ACCOUNT = "deleteOwnAccount";
    DELETE_ALL_ACCOUNTS = "deleteAllAccounts";
    BAN_USERS = "banUsers";

    // comments
    LIST_COMMENTS = "listComments";
    ADD_COMMENTS = "addComments";
    EDIT_OWN_COMMENTS = "editOwnComments";
    EDIT_ALL_COMMENTS = "editAllComments";
    DELETE_OWN_COMMENTS = "deleteOwnComments";
    DELETE_ALL_COMMENTS = "deleteAllComments";

    // history
    VIEW_HISTORY = "viewHistory";
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown privilege '{0}'")]
pub struct UnknownPrivilege(pub String);

impl FromStr for Privilege {
    type Err = UnknownPrivilege;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_value(s).ok_or_else(|| UnknownPrivilege(s.to_string()))
    }
}

impl TryFrom<String> for Privilege {
    type Error = UnknownPrivilege;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl<'de> Deserialize<'de> for Privilege {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Privilege::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl From<Privilege> for &'static str {
    fn from(value: Privilege) -> Self {
        value.value
    }
}

impl core::fmt::Display for Privilege {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.identifier)
    }
}
