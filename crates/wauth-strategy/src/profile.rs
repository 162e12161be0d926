//! Default directory record to profile mapping

use wauth_core::{DirectoryRecord, Email, NameParts, Profile, ProfileName};

/// Map an Active Directory record onto the common profile shape.
///
/// `id` prefers `objectGUID` over `uid`, the family name `sn` over
/// `surName` and the given name `gn` over `givenName`.
pub fn default_profile(record: DirectoryRecord) -> Profile {
    let text = |name: &str| record.get_str(name).map(str::to_string);

    let id = text("objectGUID").or_else(|| text("uid"));
    let display_name = text("displayName");
    let name = NameParts {
        family_name: text("sn").or_else(|| text("surName")),
        given_name: text("gn").or_else(|| text("givenName")),
    };
    let emails = text("mail").map(|mail| vec![Email::new(mail)]);

    Profile {
        id,
        display_name,
        name: Some(ProfileName::Parts(name)),
        emails,
        json: Some(record),
    }
}
