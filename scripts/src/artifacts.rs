//! Compiled contract artifacts
//!
//! Each contract is read from `<build_dir>/<ContractName>.json`, the compiler
//! output holding the contract's JSON ABI and its hex-encoded creation bytecode.

use std::{fs, path::Path};

use alloy::{
    dyn_abi::{DynSolType, DynSolValue},
    hex,
    json_abi::JsonAbi,
    primitives::Bytes,
};
use itertools::Itertools;
use serde::Deserialize;

use crate::{
    constants::{ARTIFACT_EXTENSION, UNLINKED_LIBRARY_MARKER},
    errors::ScriptError,
    types::ContractKind,
};

/// The parts of a compilation artifact needed to deploy a contract
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    /// The contract name recorded by the compiler
    #[serde(default)]
    pub contract_name: Option<String>,
    /// The contract's ABI
    pub abi: JsonAbi,
    /// The hex-encoded creation bytecode
    pub bytecode: String,
}

impl ContractArtifact {
    /// Read the artifact for the given contract from the build directory,
    /// checking the contract name it records, if any
    pub fn load(build_dir: &Path, kind: ContractKind) -> Result<Self, ScriptError> {
        let path = build_dir
            .join(kind.contract_name())
            .with_extension(ARTIFACT_EXTENSION);

        let contents = fs::read_to_string(&path)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))?;

        let artifact = Self::from_json(&contents)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))?;

        // An artifact copied under the wrong name would deploy the wrong contract
        if let Some(name) = artifact.contract_name.as_deref() {
            if name != kind.contract_name() {
                return Err(ScriptError::ArtifactParsing(format!(
                    "{}: holds contract `{}`, expected `{}`",
                    path.display(),
                    name,
                    kind
                )));
            }
        }

        Ok(artifact)
    }

    /// Parse an artifact from its JSON representation
    pub fn from_json(contents: &str) -> Result<Self, ScriptError> {
        serde_json::from_str(contents).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))
    }

    /// Decode the creation bytecode
    pub fn creation_bytecode(&self) -> Result<Bytes, ScriptError> {
        let code = self.bytecode.trim();
        let code = code.strip_prefix("0x").unwrap_or(code);

        if code.is_empty() {
            return Err(ScriptError::ArtifactParsing(
                "artifact has no creation bytecode, is it an interface or abstract contract?"
                    .to_string(),
            ));
        }
        if code.contains(UNLINKED_LIBRARY_MARKER) {
            return Err(ScriptError::ArtifactParsing(
                "bytecode contains unlinked library references".to_string(),
            ));
        }

        hex::decode(code)
            .map(Bytes::from)
            .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))
    }

    /// The number of parameters the constructor takes
    pub fn constructor_arity(&self) -> usize {
        self.abi
            .constructor
            .as_ref()
            .map(|constructor| constructor.inputs.len())
            .unwrap_or_default()
    }

    /// Build the payload of a creation transaction: the creation bytecode
    /// followed by the ABI-encoded constructor arguments.
    ///
    /// The arguments are checked against the constructor declared in the ABI.
    pub fn deploy_code(&self, args: &[DynSolValue]) -> Result<Bytes, ScriptError> {
        let arity = self.constructor_arity();
        if args.len() != arity {
            return Err(ScriptError::CalldataConstruction(format!(
                "constructor takes {} arguments, {} given",
                arity,
                args.len()
            )));
        }

        if let Some(constructor) = &self.abi.constructor {
            for (param, arg) in constructor.inputs.iter().zip_eq(args) {
                // Tuple parameters are written as `tuple` in the ABI and can't be parsed from
                // the type string alone, so only plain types are checked
                if let Ok(ty) = DynSolType::parse(&param.ty) {
                    if !ty.matches(arg) {
                        return Err(ScriptError::CalldataConstruction(format!(
                            "constructor parameter `{}` expects `{}`",
                            param.name, param.ty
                        )));
                    }
                }
            }
        }

        let mut code = self.creation_bytecode()?.to_vec();
        code.extend(DynSolValue::Tuple(args.to_vec()).abi_encode_params());
        Ok(code.into())
    }
}
