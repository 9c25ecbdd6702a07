/// Which kind of declaration a set of access flags belongs to. Several flag
/// bits mean different things on types, fields and methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Type,
    Field,
    Method,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessFlags(pub u16);

impl AccessFlags {
    pub const PUBLIC: u16 = 0x0001;
    pub const PRIVATE: u16 = 0x0002;
    pub const PROTECTED: u16 = 0x0004;
    pub const STATIC: u16 = 0x0008;
    pub const FINAL: u16 = 0x0010;
    pub const SUPER: u16 = 0x0020;
    pub const SYNCHRONIZED: u16 = 0x0020;
    pub const VOLATILE: u16 = 0x0040;
    pub const BRIDGE: u16 = 0x0040;
    pub const TRANSIENT: u16 = 0x0080;
    pub const VARARGS: u16 = 0x0080;
    pub const NATIVE: u16 = 0x0100;
    pub const INTERFACE: u16 = 0x0200;
    pub const ABSTRACT: u16 = 0x0400;
    pub const STRICT: u16 = 0x0800;
    pub const SYNTHETIC: u16 = 0x1000;
    pub const ANNOTATION: u16 = 0x2000;
    pub const ENUM: u16 = 0x4000;
    pub const MODULE: u16 = 0x8000;

    pub fn contains(self, flag: u16) -> bool {
        self.0 & flag != 0
    }

    pub fn is_public(self) -> bool {
        self.contains(Self::PUBLIC)
    }

    pub fn is_private(self) -> bool {
        self.contains(Self::PRIVATE)
    }

    pub fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    pub fn is_interface(self) -> bool {
        self.contains(Self::INTERFACE)
    }

    pub fn is_synthetic(self) -> bool {
        self.contains(Self::SYNTHETIC)
    }

    pub fn is_enum(self) -> bool {
        self.contains(Self::ENUM)
    }

    pub fn is_annotation(self) -> bool {
        self.contains(Self::ANNOTATION)
    }

    /// Flags of a nested type, merged from its InnerClasses entry: the entry
    /// decides visibility and staticness, `ACC_SUPER` is dropped.
    pub fn merge_inner(outer: u16, inner: Option<u16>) -> Self {
        let mut flags = outer & !Self::SUPER;
        if let Some(inner) = inner {
            if inner & Self::STATIC != 0 {
                flags |= Self::STATIC;
            }
            if inner & Self::PUBLIC != 0 {
                flags |= Self::PUBLIC;
            } else {
                flags &= !Self::PUBLIC;
                if inner & Self::PROTECTED != 0 {
                    flags |= Self::PROTECTED;
                } else if inner & Self::PRIVATE != 0 {
                    flags |= Self::PRIVATE;
                }
            }
        }
        Self(flags)
    }

    /// Modifier keywords in their fixed reporting order.
    pub fn names(self, kind: MemberKind) -> Vec<&'static str> {
        let is_method = kind == MemberKind::Method;
        let is_field = kind == MemberKind::Field;
        let table: [(bool, &'static str); 15] = [
            (self.contains(Self::ABSTRACT), "abstract"),
            (self.contains(Self::ANNOTATION), "annotation"),
            (self.contains(Self::ENUM), "enum"),
            (self.contains(Self::FINAL), "final"),
            (self.contains(Self::INTERFACE), "interface"),
            (is_method && self.contains(Self::NATIVE), "native"),
            (self.contains(Self::PRIVATE), "private"),
            (self.contains(Self::PROTECTED), "protected"),
            (self.contains(Self::PUBLIC), "public"),
            (self.contains(Self::STATIC), "static"),
            (is_method && self.contains(Self::STRICT), "strictfp"),
            (is_method && self.contains(Self::SYNCHRONIZED), "synchronized"),
            (is_field && self.contains(Self::TRANSIENT), "transient"),
            (is_method && self.contains(Self::VARARGS), "varargs"),
            (is_field && self.contains(Self::VOLATILE), "volatile"),
        ];
        table
            .into_iter()
            .filter_map(|(set, name)| set.then_some(name))
            .collect()
    }
}
