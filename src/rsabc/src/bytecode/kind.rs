use num_enum::{IntoPrimitive, TryFromPrimitive};

/// # 4.4.3 Multiname
///
/// The kind byte of a multiname_info entry. It selects the shape of the
/// payload that follows:
///
/// | Kind          | Code   | Payload                          |
/// | ------------- | ------ | -------------------------------- |
/// | `QName`       | `0x07` | namespace index, name index      |
/// | `QNameA`      | `0x0d` | namespace index, name index      |
/// | `RTQName`     | `0x0f` | name index                       |
/// | `RTQNameA`    | `0x10` | name index                       |
/// | `RTQNameL`    | `0x11` | (empty)                          |
/// | `RTQNameLA`   | `0x12` | (empty)                          |
/// | `Multiname`   | `0x09` | name index, ns_set index         |
/// | `MultinameA`  | `0x0e` | name index, ns_set index         |
/// | `MultinameL`  | `0x1b` | ns_set index                     |
/// | `MultinameLA` | `0x1c` | ns_set index                     |
/// | `Typename`    | `0x1d` | name index, count, count indices |
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum MultinameKind {
    QName = 0x07,
    QNameA = 0x0d,
    RTQName = 0x0f,
    RTQNameA = 0x10,
    RTQNameL = 0x11,
    RTQNameLA = 0x12,
    Multiname = 0x09,
    MultinameA = 0x0e,
    MultinameL = 0x1b,
    MultinameLA = 0x1c,
    Typename = 0x1d,
}

/// # 4.12.1 Trait type
///
/// The low 4 bits of a traits_info kind byte. The high 4 bits carry
/// [`TraitAttributes`](super::TraitAttributes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum TraitKind {
    Slot = 0,
    Method = 1,
    Getter = 2,
    Setter = 3,
    Class = 4,
    Function = 5,
    Const = 6,
}
