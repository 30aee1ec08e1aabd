pub trait FieldLike: Sized {
    fn label(self, value: impl Into<String>) -> Self;
    fn error(self, value: impl Into<String>) -> Self;
    fn required(self, value: bool) -> Self;
}

pub trait Openable: Sized {
    fn opened(self, value: bool) -> Self;
}

pub trait Loadable: Sized {
    fn loading(self, value: bool) -> Self;
}

pub trait Searchable: Sized {
    fn search(self, value: bool) -> Self;
    fn lazy_load(self, value: bool) -> Self;
}

#[macro_export]
macro_rules! impl_field_like {
    ($type:ty) => {
        impl $crate::contracts::FieldLike for $type {
            fn label(self, value: impl Into<String>) -> Self {
                <$type>::label(self, value)
            }

            fn error(self, value: impl Into<String>) -> Self {
                <$type>::error(self, value)
            }

            fn required(self, value: bool) -> Self {
                <$type>::required(self, value)
            }
        }
    };
}

#[macro_export]
macro_rules! impl_openable {
    ($type:ty) => {
        impl $crate::contracts::Openable for $type {
            fn opened(self, value: bool) -> Self {
                <$type>::opened(self, value)
            }
        }
    };
}

#[macro_export]
macro_rules! impl_loadable {
    ($type:ty) => {
        impl $crate::contracts::Loadable for $type {
            fn loading(self, value: bool) -> Self {
                <$type>::loading(self, value)
            }
        }
    };
}

#[macro_export]
macro_rules! impl_searchable {
    ($type:ty) => {
        impl $crate::contracts::Searchable for $type {
            fn search(self, value: bool) -> Self {
                <$type>::search(self, value)
            }

            fn lazy_load(self, value: bool) -> Self {
                <$type>::lazy_load(self, value)
            }
        }
    };
}
