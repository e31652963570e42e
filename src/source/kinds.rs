use std::fmt;

/// Defines a closed kind enum together with its JSON table key and a display label.
///
/// The generated `ALL` constant keeps declaration order, which is the order the
/// builder walks board lists and document tables in.
macro_rules! define_kinds {
    ( $(#[$meta:meta])* $enum_name:ident { $( ($variant:ident, $key:literal, $label:literal) ),* $(,)? } ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $enum_name {
            $( $variant, )*
        }

        impl $enum_name {
            pub const ALL: &'static [$enum_name] = &[ $( $enum_name::$variant, )* ];

            /// The JSON key of the board list and document table for this kind.
            pub fn key(self) -> &'static str {
                match self {
                    $( $enum_name::$variant => $key, )*
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $( $enum_name::$variant => $label, )*
                }
            }

            pub fn from_key(key: &str) -> Option<Self> {
                match key {
                    $( $key => Some($enum_name::$variant), )*
                    _ => None,
                }
            }
        }

        impl fmt::Display for $enum_name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.key())
            }
        }
    };
}

define_kinds! {
    /// Element (node) table kinds.
    ElementKind {
        (Standard, "elements", "Node"),
        (Flexible, "flexibleElements", "Flexible"),
        (OpenQuestion, "openQuestionElements", "OpenQuestion"),
        (Exit, "moveOnOrExitElements", "Exit"),
        (Template, "templateElements", "Template"),
    }
}

define_kinds! {
    /// Connection table kinds.
    ConnectionKind {
        (Standard, "connections", "Connection"),
        (MoveOn, "moveOnConnections", "MoveOn"),
    }
}

impl ConnectionKind {
    /// Move-on connections are only serialized in the document table, never in a board list.
    pub fn is_listed_on_board(self) -> bool {
        !matches!(self, ConnectionKind::MoveOn)
    }
}
