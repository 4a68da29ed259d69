//! Built-in Eidos and SLiM signatures.
//!
//! The process-wide registry is parsed from the declaration tables below on
//! first use and is read-only afterwards.

use once_cell::sync::Lazy;

use super::registry::{Registry, RegistryBuilder};
use super::signatures::CallEffect;

/// Classes whose instances only exist once a simulation is running.
pub const SLIM_ENTITY_CLASSES: &[&str] = &[
    "Species",
    "Community",
    "Subpopulation",
    "Individual",
    "Haplosome",
    "Mutation",
    "Substitution",
    "MutationType",
    "GenomicElementType",
    "GenomicElement",
    "Chromosome",
    "InteractionType",
    "LogFile",
    "SLiMEidosScript",
];

struct ClassDecl {
    name: &'static str,
    superclass: Option<&'static str>,
    properties: &'static [&'static str],
    methods: &'static [&'static str],
}

const CLASSES: &[ClassDecl] = &[
    ClassDecl {
        name: "Object",
        superclass: None,
        properties: &[],
        methods: &[
            "+ (void)methodSignature([Ns$ methodName = NULL])",
            "+ (void)propertySignature([Ns$ propertyName = NULL])",
            "+ (integer$)size(void)",
            "+ (integer$)length(void)",
            "- (void)str(void)",
            "- (string)stringRepresentation(void)",
        ],
    },
    ClassDecl {
        name: "Dictionary",
        superclass: Some("Object"),
        properties: &["allKeys => (is)"],
        methods: &[
            "- (void)addKeysAndValuesFrom(object$ source)",
            "- (void)appendKeysAndValuesFrom(object source)",
            "- (void)clearKeysAndValues(void)",
            "- (*)getValue(is$ key)",
            "- (logical$)identicalContents(object$ x)",
            "- (string)serialize([string$ format = \"slim\"])",
            "- (void)setValue(is$ key, * value)",
        ],
    },
    ClassDecl {
        name: "DataFrame",
        superclass: Some("Dictionary"),
        properties: &[
            "colNames => (string)",
            "dim => (integer)",
            "ncol => (integer$)",
            "nrow => (integer$)",
        ],
        methods: &[
            "- (*)asMatrix(void)",
            "- (void)cbind(object source, ...)",
            "- (void)rbind(object source, ...)",
            "- (*)subset([Nli rows = NULL], [Nlis cols = NULL])",
            "- (object<DataFrame>$)subsetColumns(lis index)",
            "- (object<DataFrame>$)subsetRows(li index, [logical$ drop = F])",
        ],
    },
    ClassDecl {
        name: "Community",
        superclass: Some("Dictionary"),
        properties: &[
            "allGenomicElementTypes => (object<GenomicElementType>)",
            "allInteractionTypes => (object<InteractionType>)",
            "allMutationTypes => (object<MutationType>)",
            "allScriptBlocks => (object<SLiMEidosScript>)",
            "allSpecies => (object<Species>)",
            "allSubpopulations => (object<Subpopulation>)",
            "cycleStage => (string$)",
            "logFiles => (object<LogFile>)",
            "modelType => (string$)",
            "tag <-> (integer$)",
            "tick <-> (integer$)",
            "verbosity <-> (integer$)",
        ],
        methods: &[
            "- (object<LogFile>$)createLogFile(string$ filePath, [Ns initialContents = NULL], [logical$ append = F], [logical$ compress = F], [string$ sep = \",\"], [Ni$ logInterval = NULL], [Ni$ flushInterval = NULL])",
            "- (void)deregisterScriptBlock(io<SLiMEidosScript> scriptBlocks)",
            "- (object<GenomicElementType>)genomicElementTypesWithIDs(integer ids)",
            "- (object<InteractionType>)interactionTypesWithIDs(integer ids)",
            "- (object<MutationType>)mutationTypesWithIDs(integer ids)",
            "- (void)outputUsage(void)",
            "- (object<SLiMEidosScript>$)registerEarlyEvent(Nis$ id, is$ source, [Ni$ start = NULL], [Ni$ end = NULL], [No<Species>$ ticksSpec = NULL])",
            "- (object<SLiMEidosScript>$)registerFirstEvent(Nis$ id, is$ source, [Ni$ start = NULL], [Ni$ end = NULL], [No<Species>$ ticksSpec = NULL])",
            "- (object<SLiMEidosScript>$)registerLateEvent(Nis$ id, is$ source, [Ni$ start = NULL], [Ni$ end = NULL], [No<Species>$ ticksSpec = NULL])",
            "- (integer)rescheduleScriptBlock(io<SLiMEidosScript>$ block, [Ni$ start = NULL], [Ni$ end = NULL], [Ni ticks = NULL])",
            "- (object<SLiMEidosScript>)scriptBlocksWithIDs(integer ids)",
            "- (void)simulationFinished(void)",
            "- (object<Species>)speciesWithIDs(integer ids)",
            "- (object<Subpopulation>)subpopulationsWithIDs(integer ids)",
        ],
    },
    ClassDecl {
        name: "Species",
        superclass: Some("Dictionary"),
        properties: &[
            "chromosome => (object<Chromosome>$)",
            "chromosomes => (object<Chromosome>)",
            "color => (string$)",
            "cycle <-> (integer$)",
            "description <-> (string$)",
            "dimensionality => (string$)",
            "generation <-> (integer$)",
            "genomicElementTypes => (object<GenomicElementType>)",
            "id => (integer$)",
            "mutationTypes => (object<MutationType>)",
            "mutations => (object<Mutation>)",
            "name => (string$)",
            "nucleotideBased => (logical$)",
            "periodicity => (string$)",
            "scriptBlocks => (object<SLiMEidosScript>)",
            "sexEnabled => (logical$)",
            "subpopulations => (object<Subpopulation>)",
            "substitutions => (object<Substitution>)",
            "tag <-> (integer$)",
        ],
        methods: &[
            "- (object<Subpopulation>$)addSubpop(is$ subpopID, integer$ size, [float$ sexRatio = 0.5], [logical$ haploid = F])",
            "- (object<Subpopulation>$)addSubpopSplit(is$ subpopID, integer$ size, io<Subpopulation>$ sourceSubpop, [float$ sexRatio = 0.5])",
            "- (integer$)countOfMutationsOfType(io<MutationType>$ mutType)",
            "- (object<Individual>)individualsWithPedigreeIDs(integer pedigreeIDs, [Niso<Subpopulation> subpops = NULL])",
            "- (void)killIndividuals(object<Individual> individuals)",
            "- (integer)mutationCounts(No<Subpopulation> subpops, [No<Mutation> mutations = NULL])",
            "- (float)mutationFrequencies(No<Subpopulation> subpops, [No<Mutation> mutations = NULL])",
            "- (object<Mutation>)mutationsOfType(io<MutationType>$ mutType)",
            "- (void)outputFixedMutations([Ns$ filePath = NULL], [logical$ append = F])",
            "- (void)outputFull([Ns$ filePath = NULL], [logical$ binary = F], [logical$ append = F])",
            "- (void)outputMutations(object<Mutation> mutations, [Ns$ filePath = NULL], [logical$ append = F])",
            "- (integer$)readFromPopulationFile(string$ filePath)",
            "- (void)recalculateFitness([Ni$ tick = NULL])",
            "- (void)simulationFinished(void)",
            "- (void)skipTick(void)",
            "- (object<Subpopulation>)subpopulationsWithIDs(integer ids)",
            "- (void)treeSeqOutput(string$ path, [logical$ simplify = T], [logical$ includeModel = T], [No$ metadata = NULL])",
            "- (void)treeSeqRememberIndividuals(object<Individual> individuals, [logical$ permanent = T])",
            "- (void)treeSeqSimplify(void)",
        ],
    },
    ClassDecl {
        name: "Subpopulation",
        superclass: Some("Dictionary"),
        properties: &[
            "cloningRate => (float)",
            "description <-> (string$)",
            "firstMaleIndex => (integer$)",
            "fitnessScaling <-> (float$)",
            "genomes => (object<Haplosome>)",
            "haplosomes => (object<Haplosome>)",
            "id => (integer$)",
            "immigrantSubpopFractions => (float)",
            "immigrantSubpopIDs => (integer)",
            "individualCount => (integer$)",
            "individuals => (object<Individual>)",
            "name <-> (string$)",
            "selfingRate => (float$)",
            "sexRatio => (float$)",
            "spatialBounds => (float)",
            "species => (object<Species>$)",
            "tag <-> (integer$)",
        ],
        methods: &[
            "- (object<Individual>)addCloned(object<Individual>$ parent, [integer$ count = 1])",
            "- (object<Individual>)addCrossed(object<Individual>$ parent1, object<Individual>$ parent2, [Nfs$ sex = NULL], [integer$ count = 1])",
            "- (object<Individual>)addEmpty([Nfs$ sex = NULL], [integer$ count = 1])",
            "- (object<Individual>)addSelfed(object<Individual>$ parent, [integer$ count = 1])",
            "- (float)cachedFitness(Ni indices)",
            "- (void)outputSample(integer$ sampleSize, [logical$ replace = T], [string$ requestedSex = \"*\"], [Ns$ filePath = NULL], [logical$ append = F])",
            "- (float)pointUniform([integer$ n = 1])",
            "- (void)removeSubpopulation(void)",
            "- (object<Individual>)sampleIndividuals(integer$ size, [logical$ replace = F], [No<Individual>$ exclude = NULL], [Ns$ sex = NULL], [Ni$ tag = NULL], [Ni$ minAge = NULL], [Ni$ maxAge = NULL], [Nl$ migrant = NULL])",
            "- (void)setCloningRate(numeric rate)",
            "- (void)setMigrationRates(io<Subpopulation> sourceSubpops, numeric rates)",
            "- (void)setSelfingRate(numeric$ rate)",
            "- (void)setSexRatio(float$ sexRatio)",
            "- (void)setSpatialBounds(numeric bounds)",
            "- (void)setSubpopulationSize(integer$ size)",
            "- (object<Individual>)subsetIndividuals([No<Individual>$ exclude = NULL], [Ns$ sex = NULL], [Ni$ tag = NULL], [Ni$ minAge = NULL], [Ni$ maxAge = NULL], [Nl$ migrant = NULL])",
            "- (void)takeMigrants(object<Individual> migrants)",
        ],
    },
    ClassDecl {
        name: "Individual",
        superclass: Some("Dictionary"),
        properties: &[
            "age <-> (integer$)",
            "color <-> (string$)",
            "fitnessScaling <-> (float$)",
            "genomes => (object<Haplosome>)",
            "haplosomes => (object<Haplosome>)",
            "index => (integer$)",
            "meanParentAge => (float$)",
            "migrant => (logical$)",
            "pedigreeID => (integer$)",
            "pedigreeParentIDs => (integer)",
            "sex => (string$)",
            "spatialPosition => (float)",
            "subpopulation => (object<Subpopulation>$)",
            "tag <-> (integer$)",
            "tagF <-> (float$)",
            "tagL0 <-> (logical$)",
            "uniqueMutations => (object<Mutation>)",
            "x <-> (float$)",
            "y <-> (float$)",
            "z <-> (float$)",
        ],
        methods: &[
            "- (logical)containsMutations(object<Mutation> mutations)",
            "- (integer$)countOfMutationsOfType(io<MutationType>$ mutType)",
            "- (float)relatedness(object<Individual> individuals)",
            "- (void)setSpatialPosition(float position)",
            "- (integer)sharedParentCount(object<Individual> individuals)",
            "- (float$)sumOfMutationsOfType(io<MutationType>$ mutType)",
            "- (object<Mutation>)uniqueMutationsOfType(io<MutationType>$ mutType)",
        ],
    },
    ClassDecl {
        name: "Haplosome",
        superclass: Some("Dictionary"),
        properties: &[
            "chromosome => (object<Chromosome>$)",
            "haplosomePedigreeID => (integer$)",
            "individual => (object<Individual>$)",
            "isNullHaplosome => (logical$)",
            "mutations => (object<Mutation>)",
            "tag <-> (integer$)",
        ],
        methods: &[
            "- (void)addMutations(object<Mutation> mutations)",
            "- (object<Mutation>)addNewMutation(io<MutationType> mutationType, numeric selectionCoeff, integer position, [Nio<Subpopulation> originSubpop = NULL], [Nis nucleotide = NULL])",
            "- (logical$)containsMarkerMutation(io<MutationType>$ mutType, integer$ position)",
            "- (logical)containsMutations(object<Mutation> mutations)",
            "- (integer$)countOfMutationsOfType(io<MutationType>$ mutType)",
            "- (object<Mutation>)mutationsOfType(io<MutationType>$ mutType)",
            "- (is)nucleotides([Ni$ start = NULL], [Ni$ end = NULL], [string$ format = \"string\"])",
            "- (integer)positionsOfMutationsOfType(io<MutationType>$ mutType)",
            "- (void)removeMutations([No<Mutation> mutations = NULL], [logical$ substitute = F])",
        ],
    },
    ClassDecl {
        name: "Mutation",
        superclass: Some("Dictionary"),
        properties: &[
            "id => (integer$)",
            "isFixed => (logical$)",
            "isSegregating => (logical$)",
            "mutationType => (object<MutationType>$)",
            "nucleotide <-> (string$)",
            "nucleotideValue <-> (integer$)",
            "originTick => (integer$)",
            "position => (integer$)",
            "selectionCoeff => (float$)",
            "subpopID <-> (integer$)",
            "tag <-> (integer$)",
        ],
        methods: &[
            "- (void)setMutationType(io<MutationType>$ mutType)",
            "- (void)setSelectionCoeff(float$ selectionCoeff)",
        ],
    },
    ClassDecl {
        name: "Substitution",
        superclass: Some("Dictionary"),
        properties: &[
            "fixationTick => (integer$)",
            "id => (integer$)",
            "mutationType => (object<MutationType>$)",
            "originTick => (integer$)",
            "position => (integer$)",
            "selectionCoeff => (float$)",
            "tag <-> (integer$)",
        ],
        methods: &[],
    },
    ClassDecl {
        name: "MutationType",
        superclass: Some("Dictionary"),
        properties: &[
            "color <-> (string$)",
            "convertToSubstitution <-> (logical$)",
            "distributionParams => (fs)",
            "distributionType => (string$)",
            "dominanceCoeff <-> (float$)",
            "id => (integer$)",
            "mutationStackPolicy <-> (string$)",
            "name <-> (string$)",
            "species => (object<Species>$)",
            "tag <-> (integer$)",
        ],
        methods: &[
            "- (float)drawSelectionCoefficient([integer$ n = 1])",
            "- (void)setDistribution(string$ distributionType, ...)",
        ],
    },
    ClassDecl {
        name: "GenomicElementType",
        superclass: Some("Dictionary"),
        properties: &[
            "color <-> (string$)",
            "id => (integer$)",
            "mutationFractions => (float)",
            "mutationTypes => (object<MutationType>)",
            "name <-> (string$)",
            "tag <-> (integer$)",
        ],
        methods: &["- (void)setMutationFractions(io<MutationType> mutationTypes, numeric proportions)"],
    },
    ClassDecl {
        name: "GenomicElement",
        superclass: Some("Dictionary"),
        properties: &[
            "endPosition => (integer$)",
            "genomicElementType => (object<GenomicElementType>$)",
            "startPosition => (integer$)",
            "tag <-> (integer$)",
        ],
        methods: &["- (void)setGenomicElementType(io<GenomicElementType>$ genomicElementType)"],
    },
    ClassDecl {
        name: "Chromosome",
        superclass: Some("Dictionary"),
        properties: &[
            "genomicElements => (object<GenomicElement>)",
            "id => (integer$)",
            "lastPosition => (integer$)",
            "mutationRates => (float)",
            "recombinationEndPositions => (integer)",
            "recombinationRates => (float)",
            "species => (object<Species>$)",
            "symbol => (string$)",
            "tag <-> (integer$)",
        ],
        methods: &[
            "- (integer)drawBreakpoints([No<Individual>$ parent = NULL], [Ni$ n = NULL])",
            "- (void)setMutationRate(numeric rates, [Ni ends = NULL], [string$ sex = \"*\"])",
            "- (void)setRecombinationRate(numeric rates, [Ni ends = NULL], [string$ sex = \"*\"])",
        ],
    },
    ClassDecl {
        name: "InteractionType",
        superclass: Some("Dictionary"),
        properties: &[
            "id => (integer$)",
            "maxDistance <-> (float$)",
            "reciprocal => (logical$)",
            "sexSegregation => (string$)",
            "spatiality => (string$)",
            "tag <-> (integer$)",
        ],
        methods: &[
            "- (float)clippedIntegral(No<Individual> receivers)",
            "- (float)distance(object<Individual>$ receiver, [No<Individual> exerters = NULL])",
            "- (void)evaluate(io<Subpopulation> subpops)",
            "- (integer)interactingNeighborCount(object<Individual> receivers, [No<Subpopulation>$ exerterSubpop = NULL])",
            "- (object<Individual>)nearestNeighbors(object<Individual>$ receiver, [integer$ count = 1], [No<Subpopulation>$ exerterSubpop = NULL])",
            "- (void)setInteractionFunction(string$ functionType, ...)",
            "- (float)strength(object<Individual>$ receiver, [No<Individual> exerters = NULL])",
            "- (float)totalOfNeighborStrengths(object<Individual> receivers, [No<Subpopulation>$ exerterSubpop = NULL])",
        ],
    },
    ClassDecl {
        name: "LogFile",
        superclass: Some("Dictionary"),
        properties: &[
            "filePath => (string$)",
            "logInterval => (integer$)",
            "precision <-> (integer$)",
            "tag <-> (integer$)",
        ],
        methods: &[
            "- (void)addCustomColumn(string$ columnName, string$ source, [* context = NULL])",
            "- (void)addCycle([No<Species>$ species = NULL])",
            "- (void)addMeanSDColumns(string$ columnName, string$ source, [* context = NULL])",
            "- (void)addTick(void)",
            "- (void)flush(void)",
            "- (void)logRow(void)",
            "- (void)setLogInterval([Ni$ logInterval = NULL])",
        ],
    },
    ClassDecl {
        name: "SLiMEidosScript",
        superclass: Some("Object"),
        properties: &[
            "active <-> (integer$)",
            "end => (integer$)",
            "id => (integer$)",
            "source => (string$)",
            "speciesSpec => (object<Species>$)",
            "start => (integer$)",
            "tag <-> (integer$)",
            "type => (string$)",
        ],
        methods: &[],
    },
];

/// Members kept for old scripts but hidden from completion.
const DEPRECATED: &[(&str, &str)] = &[
    ("Species", "generation"),
    ("Subpopulation", "genomes"),
    ("Individual", "genomes"),
];

const FUNCTIONS: &[&str] = &[
    // math
    "(numeric)abs(numeric x)",
    "(float)acos(numeric x)",
    "(float)asin(numeric x)",
    "(float)atan(numeric x)",
    "(float)ceil(float x)",
    "(float)cos(numeric x)",
    "(numeric)cumSum(numeric x)",
    "(float)exp(numeric x)",
    "(float)floor(float x)",
    "(integer)integerDiv(integer x, integer y)",
    "(integer)integerMod(integer x, integer y)",
    "(logical)isFinite(float x)",
    "(logical)isNAN(float x)",
    "(float)log(numeric x)",
    "(float)log10(numeric x)",
    "(float)log2(numeric x)",
    "(numeric$)product(numeric x)",
    "(float)round(float x)",
    "(float)sin(numeric x)",
    "(float)sqrt(numeric x)",
    "(numeric$)sum(lif x)",
    "(float)tan(numeric x)",
    "(float)trunc(float x)",
    // statistics
    "(float$)cor(numeric x, numeric y)",
    "(float$)cov(numeric x, numeric y)",
    "(+$)max(+ x, ...)",
    "(float$)mean(lif x)",
    "(float$)median(numeric x)",
    "(+$)min(+ x, ...)",
    "(numeric)pmax(numeric x, numeric y)",
    "(numeric)pmin(numeric x, numeric y)",
    "(float)quantile(numeric x, [Nf probs = NULL])",
    "(numeric)range(numeric x, ...)",
    "(float$)sd(numeric x)",
    "(float$)var(numeric x)",
    // distributions
    "(float)dnorm(float x, [numeric mean = 0], [numeric sd = 1])",
    "(float)pnorm(float q, [numeric mean = 0], [numeric sd = 1])",
    "(float)qnorm(float p, [numeric mean = 0], [numeric sd = 1])",
    "(float)rbeta(integer$ n, numeric alpha, numeric beta)",
    "(integer)rbinom(integer$ n, integer size, float prob)",
    "(integer)rdunif(integer$ n, [integer min = 0], [integer max = 1])",
    "(float)rexp(integer$ n, [numeric mu = 1])",
    "(float)rgamma(integer$ n, numeric mean, numeric shape)",
    "(integer)rgeom(integer$ n, float p)",
    "(float)rlnorm(integer$ n, [numeric meanlog = 0], [numeric sdlog = 1])",
    "(float)rnorm(integer$ n, [numeric mean = 0], [numeric sd = 1])",
    "(integer)rpois(integer$ n, numeric lambda)",
    "(float)runif(integer$ n, [numeric min = 0], [numeric max = 1])",
    // vector construction and manipulation
    "(logical$)all(logical x, ...)",
    "(logical$)any(logical x, ...)",
    "(*)c(...)",
    "(void)cat(* x, [string$ sep = \" \"], [logical$ error = F])",
    "(void)catn([* x = \"\"], [string$ sep = \" \"], [logical$ error = F])",
    "(float)float(integer$ length)",
    "(string)format(string$ format, numeric x)",
    "(logical$)identical(* x, * y)",
    "(*)ifelse(logical test, * trueValues, * falseValues)",
    "(integer)integer(integer$ length, [integer$ fill1 = 0], [integer$ fill2 = 1], [Ni fill2Indices = NULL])",
    "(integer$)length(* x)",
    "(logical)logical(integer$ length)",
    "(integer)match(* x, * table)",
    "(object<Object>)object(void)",
    "(integer)order(+ x, [logical$ ascending = T])",
    "(string$)paste(..., [string$ sep = \" \"])",
    "(string$)paste0(...)",
    "(void)print(* x, [logical$ error = F])",
    "(*)rep(* x, integer$ count)",
    "(*)repEach(* x, integer count)",
    "(*)rev(* x)",
    "(*)sample(* x, integer$ size, [logical$ replace = F], [Nif weights = NULL])",
    "(numeric)seq(numeric$ from, numeric$ to, [Nif$ by = NULL], [Ni$ length = NULL])",
    "(integer)seqAlong(* x)",
    "(integer)seqLen(integer$ length)",
    "(*)setDifference(* x, * y)",
    "(*)setIntersection(* x, * y)",
    "(*)setUnion(* x, * y)",
    "(integer$)size(* x)",
    "(+)sort(+ x, [logical$ ascending = T])",
    "(object)sortBy(object x, string$ property, [logical$ ascending = T])",
    "(void)str(* x, [logical$ error = F])",
    "(string)string(integer$ length)",
    "(integer)tabulate(integer bin, [Ni$ maxbin = NULL])",
    "(*)unique(* x, [logical$ preserveOrder = T])",
    "(integer)which(logical x)",
    "(integer)whichMax(+ x)",
    "(integer)whichMin(+ x)",
    // type conversion and testing
    "(float)asFloat(+ x)",
    "(integer)asInteger(+ x)",
    "(logical)asLogical(+ x)",
    "(string)asString(+ x)",
    "(string$)elementType(* x)",
    "(logical$)isFloat(* x)",
    "(logical$)isInteger(* x)",
    "(logical$)isLogical(* x)",
    "(logical$)isNULL(* x)",
    "(logical$)isObject(* x)",
    "(logical$)isString(* x)",
    "(string$)type(* x)",
    // strings
    "(logical)endsWith(string x, string$ suffix)",
    "(lis)grep(string$ pattern, string x, [logical$ ignoreCase = F], [string$ grammar = \"ECMAScript\"], [string$ value = \"indices\"], [logical$ fixed = F], [logical$ invert = F])",
    "(integer)nchar(string x)",
    "(logical)startsWith(string x, string$ prefix)",
    "(string)strsplit(string$ x, [string$ sep = \" \"])",
    "(string)sub(string pattern, string replacement, string x, [logical$ fixed = F])",
    "(string)substr(string x, integer first, [Ni last = NULL])",
    "(string)tolower(string x)",
    "(string)toupper(string x)",
    // matrices
    "(*)apply(* x, integer margin, string$ lambdaSource)",
    "(*)cbind(...)",
    "(integer)dim(* x)",
    "(*)matrix(* data, [integer$ nrow = 1], [integer$ ncol = 1], [logical$ byrow = F])",
    "(integer$)ncol(* x)",
    "(integer$)nrow(* x)",
    "(*)rbind(...)",
    "(*)sapply(* x, string$ lambdaSource, [string$ simplify = \"vector\"])",
    "(*)t(* x)",
    // miscellaneous
    "(void)beep([Ns$ soundName = NULL])",
    "(string$)citation(void)",
    "(float$)clock([string$ type = \"cpu\"])",
    "(object<DataFrame>$)DataFrame(...)",
    "(string$)date(void)",
    "(void)defineConstant(string$ symbol, * value)",
    "(void)defineGlobal(string$ symbol, * value)",
    "(object<Dictionary>$)Dictionary(...)",
    "(*)executeLambda(string$ lambdaSource, [ls$ timed = F])",
    "(logical)exists(string symbol)",
    "(logical$)fileExists(string$ filePath)",
    "(integer$)getSeed(void)",
    "(void)license(void)",
    "(string)ls([logical$ showSymbolTables = F])",
    "(object<DataFrame>$)readCSV(string$ filePath, [ls colNames = T], [Ns$ colTypes = NULL], [string$ sep = \",\"], [string$ quote = '\"'], [string$ dec = \".\"], [string$ comment = \"\"])",
    "(string)readFile(string$ filePath)",
    "(void)rm([Ns variableNames = NULL])",
    "(void)setSeed(integer$ seed)",
    "(void)source(string$ filePath)",
    "(void)stop([Ns$ message = NULL])",
    "(logical$)suppressWarnings(logical$ suppress)",
    "(string$)time(void)",
    "(float)version([logical$ print = T])",
    "(logical$)writeFile(string$ filePath, string contents, [logical$ append = F], [logical$ compress = F])",
    // SLiM initialization
    "(integer$)initializeAncestralNucleotides(is sequence)",
    "(object<Chromosome>$)initializeChromosome(integer$ id, [Ni$ length = NULL], [string$ type = \"A\"], [Ns$ symbol = NULL], [Ns$ name = NULL], [integer$ mutationRuns = 0])",
    "(void)initializeGeneConversion(numeric$ nonCrossoverFraction, numeric$ meanLength, numeric$ simpleConversionFraction, [numeric$ bias = 0])",
    "(object<GenomicElement>)initializeGenomicElement(io<GenomicElementType> genomicElementType, integer start, integer end)",
    "(object<GenomicElementType>$)initializeGenomicElementType(is$ id, io<MutationType> mutationTypes, numeric proportions, [Nf mutationMatrix = NULL])",
    "(void)initializeHotspotMap(numeric multipliers, [Ni ends = NULL], [string$ sex = \"*\"])",
    "(object<InteractionType>$)initializeInteractionType(is$ id, string$ spatiality, [logical$ reciprocal = F], [numeric$ maxDistance = INF], [string$ sexSegregation = \"**\"])",
    "(void)initializeMutationRate(numeric rates, [Ni ends = NULL], [string$ sex = \"*\"])",
    "(object<MutationType>$)initializeMutationType(is$ id, numeric$ dominanceCoeff, string$ distributionType, ...)",
    "(object<MutationType>$)initializeMutationTypeNuc(is$ id, numeric$ dominanceCoeff, string$ distributionType, ...)",
    "(void)initializeRecombinationRate(numeric rates, [Ni ends = NULL], [string$ sex = \"*\"])",
    "(void)initializeSex([Ns$ chromosomeType = NULL])",
    "(void)initializeSLiMModelType(string$ modelType)",
    "(void)initializeSLiMOptions([logical$ keepPedigrees = F], [string$ dimensionality = \"\"], [string$ periodicity = \"\"], [logical$ doMutationRunExperiments = T], [logical$ preventIncidentalSelfing = F], [logical$ nucleotideBased = F], [logical$ randomizeCallbacks = T])",
    "(void)initializeSpecies([integer$ tickModulo = 1], [integer$ tickPhase = 1], [string$ avatar = \"\"], [string$ color = \"\"])",
    "(void)initializeTreeSeq([logical$ recordMutations = T], [Nif$ simplificationRatio = NULL], [Ni$ simplificationInterval = NULL], [logical$ checkCoalescence = F], [logical$ runCrosschecks = F], [logical$ retainCoalescentOnly = T], [Ns$ timeUnit = NULL])",
    // SLiM utilities
    "(float$)calcFST(object<Haplosome> haplosomes1, object<Haplosome> haplosomes2, [No<Mutation> muts = NULL], [Ni$ start = NULL], [Ni$ end = NULL])",
    "(float$)calcHeterozygosity(object<Haplosome> haplosomes, [No<Mutation> muts = NULL], [Ni$ start = NULL], [Ni$ end = NULL])",
    "(float$)calcPairHeterozygosity(object<Haplosome>$ haplosome1, object<Haplosome>$ haplosome2, [Ni$ start = NULL], [Ni$ end = NULL], [logical$ infiniteSites = T])",
    "(float$)calcWattersonsTheta(object<Haplosome> haplosomes, [No<Mutation> muts = NULL], [Ni$ start = NULL], [Ni$ end = NULL])",
    "(float)mmJukesCantor(float$ alpha)",
    "(integer)nucleotideCounts(is sequence)",
    "(is)randomNucleotides(integer$ length, [Nif basis = NULL], [string$ format = \"string\"])",
];

const FUNCTION_EFFECTS: &[(&str, CallEffect)] = &[
    ("rep", CallEffect::ReturnsArgument(0)),
    ("repEach", CallEffect::ReturnsArgument(0)),
    ("rev", CallEffect::ReturnsArgument(0)),
    ("sample", CallEffect::ReturnsArgument(0)),
    ("sortBy", CallEffect::ReturnsArgument(0)),
    ("unique", CallEffect::ReturnsArgument(0)),
    ("ifelse", CallEffect::ReturnsArgument(1)),
    ("c", CallEffect::ReturnsObjectArgument),
    ("initializeMutationType", CallEffect::DefinesEntity('m')),
    ("initializeMutationTypeNuc", CallEffect::DefinesEntity('m')),
    ("initializeGenomicElementType", CallEffect::DefinesEntity('g')),
    ("initializeInteractionType", CallEffect::DefinesEntity('i')),
];

const METHOD_EFFECTS: &[(&str, &str, CallEffect)] = &[
    ("Species", "addSubpop", CallEffect::DefinesEntity('p')),
    ("Species", "addSubpopSplit", CallEffect::DefinesEntity('p')),
];

/// Builder preloaded with every built-in declaration.
pub fn builtin_builder() -> RegistryBuilder {
    let mut builder = Registry::builder();
    for class in CLASSES {
        builder = builder.class(class.name, class.superclass);
    }
    for class in CLASSES {
        for property in class.properties {
            builder = builder.property(class.name, property);
        }
        for method in class.methods {
            builder = builder.method(class.name, method);
        }
    }
    for prototype in FUNCTIONS {
        builder = builder.function(prototype);
    }
    for (name, effect) in FUNCTION_EFFECTS {
        builder = builder.function_effect(name, *effect);
    }
    for (class, name, effect) in METHOD_EFFECTS {
        builder = builder.method_effect(class, name, *effect);
    }
    for (class, member) in DEPRECATED {
        builder = builder.deprecated(class, member);
    }
    builder
}

static BUILTINS: Lazy<Registry> = Lazy::new(|| builtin_builder().build());

/// The process-wide built-in registry, parsed on first use.
pub fn builtin_registry() -> &'static Registry {
    &BUILTINS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::mask::TypeMask;
    use crate::types::registry::SignatureRegistry;

    #[test]
    fn test_all_declarations_parse() {
        let registry = builtin_builder().try_build().expect("built-in declarations must parse");
        assert_eq!(registry.class_count(), CLASSES.len());
        assert_eq!(registry.function_count(), FUNCTIONS.len());
    }

    #[test]
    fn test_entity_classes_exist() {
        let registry = builtin_registry();
        for name in SLIM_ENTITY_CLASSES {
            assert!(registry.class_id(name).is_some(), "{name} missing");
        }
    }

    #[test]
    fn test_add_subpop_signature() {
        let registry = builtin_registry();
        let species = registry.class_id("Species").unwrap();
        let method = registry.method(species, "addSubpop").unwrap();
        assert_eq!(method.returns.class, registry.class_id("Subpopulation"));
        assert_eq!(method.effect, CallEffect::DefinesEntity('p'));
        assert_eq!(method.params[0].ty.mask, TypeMask::INT | TypeMask::STRING);
    }

    #[test]
    fn test_inherited_dictionary_methods() {
        let registry = builtin_registry();
        let individual = registry.class_id("Individual").unwrap();
        assert!(registry.method(individual, "setValue").is_some());
        assert!(registry.method(individual, "size").is_some());
    }

    #[test]
    fn test_deprecated_members_flagged() {
        let registry = builtin_registry();
        let subpop = registry.class_id("Subpopulation").unwrap();
        assert!(registry.property(subpop, "genomes").unwrap().deprecated);
        assert!(!registry.property(subpop, "haplosomes").unwrap().deprecated);
    }
}
