//! ENS reverse resolution
//!
//! Looks up the primary name of an address and only accepts it when the name
//! resolves forward to the same address. Every failure collapses to `None`.

use crate::config::{ChainConstants, Config};
use crate::rpc::RpcClient;
use alloy::primitives::{keccak256, Address, B256};
use alloy::sol;
use alloy::sol_types::SolCall;
use std::future::Future;
use tracing::debug;

sol! {
    function resolver(bytes32 node) external view returns (address);
    function name(bytes32 node) external view returns (string);
    function addr(bytes32 node) external view returns (address);
}

/// Best-effort address to name lookup
pub trait NameResolver: Send + Sync {
    fn lookup(&self, address: Address) -> impl Future<Output = Option<String>> + Send;
}

/// Resolver that never finds a name, used when ENS is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNames;

impl NameResolver for NoNames {
    async fn lookup(&self, _address: Address) -> Option<String> {
        None
    }
}

/// ENS resolver backed by an Ethereum mainnet RPC
#[derive(Clone)]
pub struct EnsResolver {
    rpc: RpcClient,
    registry: Address,
}

impl EnsResolver {
    pub fn new(rpc: RpcClient) -> Self {
        Self {
            rpc,
            registry: ChainConstants::ENS_REGISTRY,
        }
    }

    async fn resolver_for(&self, node: B256) -> Option<Address> {
        let data = self
            .rpc
            .eth_call(self.registry, &resolverCall { node }.abi_encode())
            .await
            .ok()?;
        let resolver = resolverCall::abi_decode_returns(&data).ok()?;
        (!resolver.is_zero()).then_some(resolver)
    }

    async fn reverse_name(&self, address: Address) -> Option<String> {
        let node = reverse_node(address);
        let resolver = self.resolver_for(node).await?;
        let data = self.rpc.eth_call(resolver, &nameCall { node }.abi_encode()).await.ok()?;
        let name = nameCall::abi_decode_returns(&data).ok()?;
        (!name.is_empty()).then_some(name)
    }

    async fn forward_address(&self, name: &str) -> Option<Address> {
        let node = namehash(name);
        let resolver = self.resolver_for(node).await?;
        let data = self.rpc.eth_call(resolver, &addrCall { node }.abi_encode()).await.ok()?;
        addrCall::abi_decode_returns(&data).ok()
    }
}

impl NameResolver for EnsResolver {
    async fn lookup(&self, address: Address) -> Option<String> {
        if address.is_zero() {
            return None;
        }

        let name = self.reverse_name(address).await?;

        // A reverse record is only trusted if the name points back at us
        match self.forward_address(&name).await {
            Some(forward) if forward == address => {
                debug!("[ENS] {:?} -> {}", address, name);
                Some(name)
            }
            _ => {
                debug!("[ENS] ignoring unverified reverse record {} for {:?}", name, address);
                None
            }
        }
    }
}

/// Resolver selected by `ENS_ENABLED`
#[derive(Clone)]
pub enum Names {
    Ens(EnsResolver),
    Disabled,
}

impl Names {
    pub fn from_config(config: &Config) -> Self {
        if config.ens_enabled {
            Names::Ens(EnsResolver::new(RpcClient::new(
                config.ens_rpc_url.clone(),
                config.read_timeout,
            )))
        } else {
            Names::Disabled
        }
    }
}

impl NameResolver for Names {
    async fn lookup(&self, address: Address) -> Option<String> {
        match self {
            Names::Ens(ens) => ens.lookup(address).await,
            Names::Disabled => None,
        }
    }
}

/// EIP-137 namehash
pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    if name.is_empty() {
        return node;
    }

    for label in name.rsplit('.') {
        let label_hash = keccak256(label.as_bytes());
        let mut packed = [0u8; 64];
        packed[..32].copy_from_slice(node.as_slice());
        packed[32..].copy_from_slice(label_hash.as_slice());
        node = keccak256(packed);
    }

    node
}

/// Node of `<hex address>.addr.reverse`
pub fn reverse_node(address: Address) -> B256 {
    namehash(&format!("{}.addr.reverse", hex::encode(address.as_slice())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::b256;

    #[test]
    fn test_namehash_known_vectors() {
        assert_eq!(namehash(""), B256::ZERO);
        assert_eq!(
            namehash("eth"),
            b256!("93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae")
        );
        assert_eq!(
            namehash("foo.eth"),
            b256!("de9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f")
        );
    }

    #[test]
    fn test_reverse_node_uses_lowercase_hex() {
        let address: Address = "0x00000000000C2E074eC69A0dFb2997BA6C7d2e1e".parse().unwrap();
        assert_eq!(
            reverse_node(address),
            namehash("00000000000c2e074ec69a0dfb2997ba6c7d2e1e.addr.reverse")
        );
    }

    #[tokio::test]
    async fn test_no_names() {
        assert_eq!(NoNames.lookup(Address::ZERO).await, None);
    }

    #[tokio::test]
    async fn test_disabled_names() {
        let config = Config {
            ens_enabled: false,
            ..Config::default()
        };
        let names = Names::from_config(&config);
        assert!(matches!(names, Names::Disabled));
        assert_eq!(names.lookup(ChainConstants::ENS_REGISTRY).await, None);
    }
}
