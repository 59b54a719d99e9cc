use syn::{parse_quote, Data, DataStruct, DeriveInput, Fields};
use syn::ext::IdentExt;
use proc_macro::TokenStream;
use quote::quote;

pub fn impl_component(ast: &DeriveInput) -> TokenStream {
    let name = &ast.ident;
    // Components are stored as `dyn Any`, which requires `'static`.
    let mut generics = ast.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!('static));
    }
    for param in generics.lifetimes_mut() {
        param.bounds.push(parse_quote!('static));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = match &ast.data {
        Data::Struct(DataStruct { fields: Fields::Named(named), .. }) => {
            named.named.iter().collect::<Vec<_>>()
        },
        Data::Struct(_) => vec![],
        _ => {
            return syn::Error::new_spanned(name, "Component can only be derived for structs")
                .to_compile_error()
                .into();
        },
    };

    let arms = fields.iter().map(|field| {
        let ident = field.ident.as_ref().unwrap();
        let ty = &field.ty;
        let key = ident.unraw().to_string();
        quote! {
            #key => {
                let value = value.downcast::<#ty>().map_err(|_| toyblock::error::FieldError::Type {
                    expected: ::std::any::type_name::<#ty>(),
                })?;
                self.#ident = *value;
                Ok(())
            }
        }
    });

    let gen = quote! {
        impl #impl_generics toyblock::components::Component for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn set_field(
                &mut self,
                field: &str,
                value: ::std::boxed::Box<dyn ::std::any::Any>,
            ) -> ::std::result::Result<(), toyblock::error::FieldError> {
                match field {
                    #(#arms,)*
                    _ => Err(toyblock::error::FieldError::Unknown),
                }
            }
        }
    };
    gen.into()
}
