/// ドライバ側の u32 列挙値を閉じたRust列挙型として定義する
///
/// `from_raw` は範囲外の値に対して `None` を返し、`name` はログ表示用の名前を返す。
macro_rules! hal_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident = $value:expr => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        pub enum $name {
            $($variant = $value,)+
        }

        impl $name {
            /// 定義順に並んだすべての値
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// 生の値から変換する
            pub fn from_raw(raw: u32) -> Option<Self> {
                match raw {
                    $(v if v == $value => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// ログに表示する名前
            pub const fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            pub const fn raw(self) -> u32 {
                self as u32
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}
