mod model;

use proc_macro::TokenStream;

/// Derive macro implementing `datamapa::Model` for a struct.
///
/// The technical id is taken from the field marked `#[model(id)]`, or from a
/// field named `id` when no field is marked. That field must have the type
/// `Option<datamapa::RecordId>`; `None` means "not yet persisted".
///
/// ```ignore
/// #[derive(Default, Model)]
/// struct Person {
///     id: Option<RecordId>,
///     name: String,
/// }
///
/// #[derive(Default, Model)]
/// struct Tag {
///     #[model(id)]
///     key: Option<RecordId>,
///     label: String,
/// }
/// ```
#[proc_macro_derive(Model, attributes(model))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    model::derive_model(input)
}
