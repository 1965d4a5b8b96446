use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, FieldsNamed, FieldsUnnamed, Generics, Type, parse_quote};

use crate::attr::parse_field_attrs;

pub(crate) fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => expand_named(&input, named),
            Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                expand_newtype(&input, unnamed)
            }
            _ => expand_opaque(&input),
        },
        Data::Enum(_) => expand_opaque(&input),
        Data::Union(data) => Err(syn::Error::new_spanned(
            data.union_token,
            "`Example` cannot be derived for unions",
        )),
    }
}

/// Require `Example` on every populated field type of a generic struct.
fn with_field_bounds<'a>(
    generics: &Generics,
    field_types: impl IntoIterator<Item = &'a Type>,
) -> Generics {
    let mut generics = generics.clone();
    if generics.type_params().next().is_some() {
        let where_clause = generics.make_where_clause();
        for ty in field_types {
            where_clause
                .predicates
                .push(parse_quote!(#ty: ::exemplar::Example));
        }
    }
    generics
}

fn capability_methods() -> TokenStream {
    quote! {
        fn capability(&self) -> ::exemplar::Capability {
            ::exemplar::capabilities!(Self).resolve()
        }

        fn invoke(
            &mut self,
            capability: ::exemplar::Capability,
            value: &str,
        ) -> ::core::result::Result<(), ::exemplar::CoerceError> {
            ::exemplar::capabilities!(Self).invoke(self, capability, value)
        }
    }
}

fn expand_named(input: &DeriveInput, named: &FieldsNamed) -> syn::Result<TokenStream> {
    let name = &input.ident;

    let mut idents = Vec::new();
    let mut names = Vec::new();
    let mut tags = Vec::new();
    let mut types = Vec::new();
    for field in &named.named {
        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.ignored {
            continue;
        }
        let Some(ident) = &field.ident else {
            continue;
        };
        names.push(ident.unraw().to_string());
        tags.push(match &attrs.default {
            Some(value) => quote!(::exemplar::Tag::new().with_default(#value)),
            None => quote!(::exemplar::Tag::new()),
        });
        idents.push(ident);
        types.push(&field.ty);
    }

    let generics = with_field_bounds(&input.generics, types);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let capability = capability_methods();

    Ok(quote! {
        impl #impl_generics ::exemplar::Example for #name #ty_generics #where_clause {
            fn is_struct() -> bool {
                true
            }

            #capability

            fn target(&mut self) -> ::exemplar::Target<'_> {
                ::exemplar::Target::Struct(self)
            }
        }

        impl #impl_generics ::exemplar::Struct for #name #ty_generics #where_clause {
            fn fields(&mut self) -> ::std::vec::Vec<::exemplar::Field<'_>> {
                let Self { #(#idents,)* .. } = self;
                ::std::vec![
                    #(::exemplar::Field::new(#names, #tags, #idents)),*
                ]
            }
        }
    })
}

fn expand_newtype(input: &DeriveInput, unnamed: &FieldsUnnamed) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let inner = &unnamed.unnamed[0].ty;
    let generics = with_field_bounds(&input.generics, [inner]);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::exemplar::Example for #name #ty_generics #where_clause {
            fn is_struct() -> bool {
                <#inner as ::exemplar::Example>::is_struct()
            }

            fn capability(&self) -> ::exemplar::Capability {
                match ::exemplar::capabilities!(Self).resolve() {
                    ::exemplar::Capability::None => ::exemplar::Example::capability(&self.0),
                    own => own,
                }
            }

            fn invoke(
                &mut self,
                capability: ::exemplar::Capability,
                value: &str,
            ) -> ::core::result::Result<(), ::exemplar::CoerceError> {
                let own = ::exemplar::capabilities!(Self);
                if own.resolve() == ::exemplar::Capability::None {
                    ::exemplar::Example::invoke(&mut self.0, capability, value)
                } else {
                    own.invoke(self, capability, value)
                }
            }

            fn target(&mut self) -> ::exemplar::Target<'_> {
                ::exemplar::Example::target(&mut self.0)
            }
        }
    })
}

fn expand_opaque(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let capability = capability_methods();

    Ok(quote! {
        impl #impl_generics ::exemplar::Example for #name #ty_generics #where_clause {
            #capability

            fn target(&mut self) -> ::exemplar::Target<'_> {
                ::exemplar::Target::Opaque
            }
        }
    })
}
